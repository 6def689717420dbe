//! Word document side of a merge
//!
//! - [`DocxPackage`]: zip package held in memory, story parts parsed with quick-xml
//! - Bookmark lookup and replacement over the parsed events
//! - [`DocxApp`]: the document host used by a run

mod app;
mod bookmarks;
mod package;
mod sample;

pub use app::{DocxApp, DocxDocument};
pub use package::{DocxPackage, MAIN_PART};
