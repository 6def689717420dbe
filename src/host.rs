//! Automation seams for the two host applications a run drives.
//!
//! The loader and filler only talk to these traits. `excel::CalamineApp` and
//! `docx::DocxApp` are the native implementations; tests plug in fakes.

use crate::error::MergeResult;
use std::path::Path;

/// A spreadsheet application able to open workbooks.
pub trait SpreadsheetApp {
    type Workbook: Workbook;

    fn open_workbook(&mut self, path: &Path) -> MergeResult<Self::Workbook>;

    /// Terminate the application instance.
    fn quit(&mut self) -> MergeResult<()>;
}

/// An open workbook. Must be closed (without saving) once reading is done.
pub trait Workbook {
    type Sheet: Worksheet;

    fn worksheet(&mut self, name: &str) -> MergeResult<Self::Sheet>;

    fn close(&mut self) -> MergeResult<()>;
}

/// Cell access with 1-based row and column numbers, like the host's `Cells(row, col)`.
pub trait Worksheet {
    /// Text of the cell, or `None` when the cell is null or missing.
    fn cell(&self, row: u32, col: u32) -> Option<String>;
}

/// A document-processing application able to instantiate templates.
pub trait DocumentApp {
    type Document: Document;

    /// New in-memory document based on `template`. The template file is not modified.
    fn create_from_template(&mut self, template: &Path) -> MergeResult<Self::Document>;

    fn quit(&mut self) -> MergeResult<()>;
}

pub trait Document {
    fn bookmark_exists(&self, name: &str) -> bool;

    fn set_bookmark_text(&mut self, name: &str, text: &str) -> MergeResult<()>;

    fn save_as(&mut self, path: &Path) -> MergeResult<()>;

    /// Discard the in-memory instance.
    fn close(self) -> MergeResult<()>;
}
