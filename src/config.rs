//! Fixed defaults. Nothing is persisted between runs; per-invocation
//! overrides come from CLI flags or the environment variables below.

/// Worksheet read when the user does not name one.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Filename prefix for generated documents.
pub const DEFAULT_PREFIX: &str = "Output";

/// Extension of every generated document.
pub const OUTPUT_EXTENSION: &str = "docx";

pub const ENV_SHEET: &str = "DOCMERGE_SHEET";
pub const ENV_PREFIX: &str = "DOCMERGE_PREFIX";

/// Default tracing filter when RUST_LOG is unset.
pub const DEFAULT_LOG_FILTER: &str = "docmerge=warn";
pub const VERBOSE_LOG_FILTER: &str = "docmerge=debug";

/// Shown once before the interactive form starts.
pub const USAGE_INSTRUCTIONS: &str = "\
Pick the spreadsheet, the Word template and the output folder in that order,
then run to generate one document per row.

1. The Word template needs bookmarks at every place a value should go.
2. The first row of the worksheet holds the bookmark names, for example:

   -------------------------------
   |  Time    |  Name   | Budget |
   |  Morning |  Ming   |  100   |
   |  Noon    |  Hua    |  300   |
   |  Evening |  Mei    |  600   |
   -------------------------------

Data is read until the first row whose first cell is empty.";
