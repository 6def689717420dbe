//! Document host backed by [`DocxPackage`]

use super::package::DocxPackage;
use crate::error::MergeResult;
use crate::host::{Document, DocumentApp};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DocxApp {
    created: usize,
}

impl DocxApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents created since this instance started.
    pub fn documents_created(&self) -> usize {
        self.created
    }
}

impl DocumentApp for DocxApp {
    type Document = DocxDocument;

    fn create_from_template(&mut self, template: &Path) -> MergeResult<DocxDocument> {
        let mut package = DocxPackage::open(template)?;
        package.convert_template_to_document();
        self.created += 1;
        Ok(DocxDocument { package })
    }

    fn quit(&mut self) -> MergeResult<()> {
        debug!(documents = self.created, "document host released");
        Ok(())
    }
}

pub struct DocxDocument {
    package: DocxPackage,
}

impl Document for DocxDocument {
    fn bookmark_exists(&self, name: &str) -> bool {
        self.package.has_bookmark(name)
    }

    fn set_bookmark_text(&mut self, name: &str, text: &str) -> MergeResult<()> {
        self.package.set_bookmark_text(name, text)
    }

    fn save_as(&mut self, path: &Path) -> MergeResult<()> {
        self.package.save(path)?;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }

    fn close(self) -> MergeResult<()> {
        Ok(())
    }
}
