//! Minimal template documents

use super::package::{DocxPackage, MAIN_PART};
use crate::error::MergeResult;
use quick_xml::escape::escape;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

impl DocxPackage {
    /// A document with a title line and one `label: [label]` paragraph per
    /// bookmark, the bracketed part being the bookmarked range.
    pub fn sample(title: &str, bookmarks: &[&str]) -> MergeResult<Self> {
        let mut body = paragraph(&run(title));
        for (id, name) in bookmarks.iter().enumerate() {
            let escaped = escape(*name);
            let content = format!(
                r#"{}<w:bookmarkStart w:id="{id}" w:name="{escaped}"/>{}<w:bookmarkEnd w:id="{id}"/>"#,
                run(&format!("{}: ", name)),
                run(&format!("[{}]", name)),
            );
            body.push_str(&paragraph(&content));
        }
        Self::from_document_body(&body)
    }

    /// A package whose `w:body` holds `body` verbatim.
    pub fn from_document_body(body: &str) -> MergeResult<Self> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
        );
        Self::from_parts([
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
            (MAIN_PART, document.into_bytes()),
        ])
    }
}

fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

fn paragraph(content: &str) -> String {
    format!("<w:p>{}</w:p>", content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_lists_bookmarks_with_placeholder_text() {
        let package = DocxPackage::sample("Invoice", &["Name", "Amount"]).unwrap();
        assert_eq!(package.bookmark_names(), vec!["Name", "Amount"]);
        assert_eq!(package.bookmark_text("Amount").as_deref(), Some("[Amount]"));
        assert_eq!(package.text(), "Invoice\nName: [Name]\nAmount: [Amount]");
        assert!(!package.is_template());
    }

    #[test]
    fn test_sample_escapes_names() {
        let package = DocxPackage::sample("T", &["R&D"]).unwrap();
        assert_eq!(package.bookmark_names(), vec!["R&D"]);
        assert_eq!(package.text(), "T\nR&D: [R&D]");
    }
}
