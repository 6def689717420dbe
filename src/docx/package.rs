//! In-memory WordprocessingML package (.docx / .dotx)

use super::bookmarks::{self, XmlEvents};
use crate::error::{MergeError, MergeResult};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub const MAIN_PART: &str = "word/document.xml";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const TEMPLATE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

fn story_part_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^word/(document|header\d*|footer\d*)\.xml$").expect("valid story part regex")
    })
}

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// A part that can carry bookmarks, held as parsed events.
#[derive(Debug, Clone)]
struct StoryPart {
    entry: usize,
    events: XmlEvents,
    dirty: bool,
}

/// Every zip entry of a package, in original order. Story parts are parsed
/// for bookmark editing; all other entries are copied through unchanged.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
    stories: Vec<StoryPart>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> MergeResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            MergeError::InvalidTemplate(msg) => {
                MergeError::InvalidTemplate(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> MergeResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for idx in 0..archive.len() {
            let mut file = archive.by_index(idx)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
                data,
            });
        }

        Self::from_entries(entries)
    }

    /// Build a package from `(part name, bytes)` pairs.
    pub fn from_parts<I, N>(parts: I) -> MergeResult<Self>
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<String>,
    {
        let entries = parts
            .into_iter()
            .map(|(name, data)| PackageEntry {
                name: name.into(),
                data,
                stored: false,
                is_dir: false,
            })
            .collect();
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<PackageEntry>) -> MergeResult<Self> {
        if !entries.iter().any(|e| e.name == MAIN_PART) {
            return Err(MergeError::InvalidTemplate(format!(
                "missing {} (not a Word document)",
                MAIN_PART
            )));
        }

        let mut stories = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            if story_part_pattern().is_match(&entry.name) {
                let events = parse_events(&entry.data)?;
                debug!(part = %entry.name, events = events.len(), "story part parsed");
                stories.push(StoryPart {
                    entry: idx,
                    events,
                    dirty: false,
                });
            }
        }

        Ok(Self { entries, stories })
    }

    /// Part names in package order.
    pub fn part_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Whether the package declares itself a template (.dotx).
    pub fn is_template(&self) -> bool {
        self.content_types()
            .map(|ct| ct.contains(TEMPLATE_CONTENT_TYPE))
            .unwrap_or(false)
    }

    /// Rewrite the main part's content type from template to document.
    pub fn convert_template_to_document(&mut self) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == CONTENT_TYPES_PART) else {
            return;
        };
        let content = String::from_utf8_lossy(&entry.data);
        if content.contains(TEMPLATE_CONTENT_TYPE) {
            entry.data = content
                .replace(TEMPLATE_CONTENT_TYPE, DOCUMENT_CONTENT_TYPE)
                .into_bytes();
            debug!("template content type rewritten to document");
        }
    }

    fn content_types(&self) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.name == CONTENT_TYPES_PART)
            .map(|e| String::from_utf8_lossy(&e.data).into_owned())
    }

    /// Bookmark names across all story parts (main document first).
    pub fn bookmark_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for story in self.ordered_stories() {
            for name in bookmarks::bookmark_names(&story.events) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn has_bookmark(&self, name: &str) -> bool {
        self.stories
            .iter()
            .any(|s| bookmarks::find_bookmark(&s.events, name).is_some())
    }

    pub fn bookmark_text(&self, name: &str) -> Option<String> {
        self.ordered_stories()
            .find_map(|s| bookmarks::bookmark_text(&s.events, name))
    }

    /// Replace a bookmark's content, searching the main document first.
    pub fn set_bookmark_text(&mut self, name: &str, text: &str) -> MergeResult<()> {
        let main = self.main_story_index();
        let mut order: Vec<usize> = (0..self.stories.len()).collect();
        if let Some(main) = main {
            order.retain(|&i| i != main);
            order.insert(0, main);
        }

        for idx in order {
            let story = &mut self.stories[idx];
            if bookmarks::replace_bookmark_text(&mut story.events, name, text) {
                story.dirty = true;
                return Ok(());
            }
        }
        Err(MergeError::BookmarkNotFound(name.to_string()))
    }

    /// Visible text of the main document, one line per paragraph.
    pub fn text(&self) -> String {
        self.main_story_index()
            .map(|idx| bookmarks::plain_text(&self.stories[idx].events))
            .unwrap_or_default()
    }

    /// Visible text of any story part by name, e.g. `word/header1.xml`.
    pub fn part_text(&self, part: &str) -> Option<String> {
        self.stories
            .iter()
            .find(|s| self.entries[s.entry].name == part)
            .map(|s| bookmarks::plain_text(&s.events))
    }

    fn main_story_index(&self) -> Option<usize> {
        self.stories
            .iter()
            .position(|s| self.entries[s.entry].name == MAIN_PART)
    }

    fn ordered_stories(&self) -> impl Iterator<Item = &StoryPart> {
        let main = self.main_story_index();
        main.map(|idx| &self.stories[idx]).into_iter().chain(
            self.stories
                .iter()
                .enumerate()
                .filter(move |(idx, _)| Some(*idx) != main)
                .map(|(_, s)| s),
        )
    }

    pub fn save(&self, path: &Path) -> MergeResult<()> {
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> MergeResult<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> MergeResult<W> {
        let mut zip = zip::ZipWriter::new(writer);

        for (idx, entry) in self.entries.iter().enumerate() {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            zip.start_file(entry.name.as_str(), options)?;
            match self.stories.iter().find(|s| s.entry == idx && s.dirty) {
                Some(story) => zip.write_all(&write_events(&story.events)?)?,
                None => zip.write_all(&entry.data)?,
            }
        }

        Ok(zip.finish()?)
    }
}

pub(crate) fn parse_events(data: &[u8]) -> MergeResult<XmlEvents> {
    let mut reader = Reader::from_reader(data);
    let mut events = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            event => events.push(event.into_owned()),
        }
    }
    Ok(events)
}

pub(crate) fn write_events(events: &[Event<'static>]) -> MergeResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    for event in events {
        writer.write_event(event)?;
    }
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml"/></Types>"#;

    fn document(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
        .into_bytes()
    }

    fn header(body: &str) -> Vec<u8> {
        format!(
            r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{body}</w:hdr>"#
        )
        .into_bytes()
    }

    fn template() -> DocxPackage {
        DocxPackage::from_parts([
            (CONTENT_TYPES_PART, CONTENT_TYPES.as_bytes().to_vec()),
            (
                "word/header1.xml",
                header(r#"<w:p><w:bookmarkStart w:id="5" w:name="Company"/><w:r><w:t>ACME</w:t></w:r><w:bookmarkEnd w:id="5"/></w:p>"#),
            ),
            (
                MAIN_PART,
                document(r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:bookmarkStart w:id="0" w:name="Name"/><w:r><w:t>[Name]</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>"#),
            ),
            ("word/styles.xml", b"<w:styles/>".to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_main_part_is_invalid() {
        let err = DocxPackage::from_parts([("word/styles.xml", b"<x/>".to_vec())]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidTemplate(_)));
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        let err = DocxPackage::from_reader(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, MergeError::Zip(_)));
    }

    #[test]
    fn test_bookmarks_listed_main_document_first() {
        let package = template();
        assert_eq!(package.bookmark_names(), vec!["Name", "Company"]);
        assert!(package.has_bookmark("Company"));
        assert!(!package.has_bookmark("Missing"));
    }

    #[test]
    fn test_set_bookmark_in_header_part() {
        let mut package = template();
        package.set_bookmark_text("Company", "Initech").unwrap();
        assert_eq!(package.part_text("word/header1.xml").as_deref(), Some("Initech"));
        assert_eq!(package.text(), "Hello [Name]");
    }

    #[test]
    fn test_set_missing_bookmark_errors() {
        let mut package = template();
        let err = package.set_bookmark_text("Missing", "x").unwrap_err();
        assert!(matches!(err, MergeError::BookmarkNotFound(name) if name == "Missing"));
    }

    #[test]
    fn test_round_trip_preserves_order_and_untouched_parts() {
        let mut package = template();
        package.set_bookmark_text("Name", "Ada").unwrap();
        let bytes = package.to_bytes().unwrap();

        let reopened = DocxPackage::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(
            reopened.part_names(),
            vec![CONTENT_TYPES_PART, "word/header1.xml", MAIN_PART, "word/styles.xml"]
        );
        assert_eq!(reopened.text(), "Hello Ada");
        assert_eq!(reopened.bookmark_text("Company").as_deref(), Some("ACME"));
        assert_eq!(
            reopened.entries[3].data,
            b"<w:styles/>".to_vec(),
            "non-story parts are copied byte for byte"
        );
    }

    #[test]
    fn test_convert_template_content_type() {
        let mut package = template();
        assert!(package.is_template());
        package.convert_template_to_document();
        assert!(!package.is_template());
        assert!(package
            .content_types()
            .unwrap()
            .contains(DOCUMENT_CONTENT_TYPE));
    }
}
