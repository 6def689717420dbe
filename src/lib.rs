//! docmerge - batch Word documents from spreadsheet rows
//!
//! Reads the header row and data rows of a worksheet, then fills the
//! bookmarks of a Word template once per row and saves one document each.
//!
//! # Features
//!
//! - `.xlsx`/`.xls`/`.ods` input through calamine
//! - Bookmark replacement in `.docx` and `.dotx` templates, body, headers and footers
//! - A staged form that only offers a step once the previous one is complete
//! - Host traits so the spreadsheet and document sides can be swapped in tests
//!
//! # Example
//!
//! ```no_run
//! use docmerge::docx::DocxApp;
//! use docmerge::excel::CalamineApp;
//! use docmerge::form::form_from_paths;
//! use std::path::Path;
//!
//! let mut form = form_from_paths(
//!     Path::new("people.xlsx"),
//!     "Sheet1",
//!     Path::new("letter.docx"),
//!     Path::new("out"),
//!     "Letter",
//! )?;
//! let outcome = form.run(&mut CalamineApp::new(), &mut DocxApp::new(), |_| {});
//! println!("{}", outcome.message());
//! # Ok::<(), docmerge::error::MergeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod docx;
pub mod error;
pub mod excel;
pub mod filler;
pub mod form;
pub mod host;
pub mod loader;
pub mod types;

// Re-export commonly used types
pub use error::{MergeError, MergeResult};
pub use types::{Record, RecordSet};
