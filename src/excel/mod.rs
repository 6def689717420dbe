//! Spreadsheet side of a merge
//!
//! - Reading: calamine-backed [`CalamineApp`] implementing the spreadsheet host
//! - Writing: the sample workbook created by `docmerge init`

mod reader;
mod sample;

pub use reader::{cell_to_text, CalamineApp, CalamineSheet, CalamineWorkbook};
pub use sample::{write_sample_workbook, SAMPLE_FIELDS};
