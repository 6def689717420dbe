use thiserror::Error;

pub type MergeResult<T> = Result<T, MergeError>;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worksheet '{sheet}' not found (available: {})", available.join(", "))]
    WorksheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Bookmark '{0}' not found in document")]
    BookmarkNotFound(String),

    #[error("No field names found in the header row of the worksheet")]
    NoHeaders,

    #[error("No data rows found below the header row")]
    NoRecords,

    #[error("Step not available yet: {0}")]
    StepNotAvailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
