//! Bookmark lookup and replacement over a WordprocessingML event stream.
//!
//! A story part (`word/document.xml`, headers, footers) is held as a flat
//! list of owned quick-xml events. Elements are matched by local name so
//! the namespace prefix in use does not matter.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

pub(crate) type XmlEvents = Vec<Event<'static>>;

/// Event indices of a bookmark's `bookmarkStart` and matching `bookmarkEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BookmarkSpan {
    pub start: usize,
    pub end: usize,
}

/// Elements a run cannot be placed in directly.
const BLOCK_CONTAINERS: [&[u8]; 9] = [
    b"body",
    b"tc",
    b"hdr",
    b"ftr",
    b"txbxContent",
    b"footnote",
    b"endnote",
    b"comment",
    b"docPartBody",
];

/// Table structure that holds only rows and cells; no run or paragraph fits.
const TABLE_STRUCTURE: [&[u8]; 2] = [b"tr", b"tbl"];

/// Where a fresh run can go at a given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPlacement {
    Inline,
    InNewParagraph,
    Nowhere,
}

/// Run content replaced along with the text.
const RUN_BREAKS: [&[u8]; 4] = [b"tab", b"br", b"cr", b"sym"];

fn marker<'a>(event: &'a Event<'static>, local: &[u8]) -> Option<&'a BytesStart<'static>> {
    match event {
        Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == local => Some(e),
        _ => None,
    }
}

fn is_start(event: &Event<'static>, local: &[u8]) -> bool {
    matches!(event, Event::Start(e) if e.local_name().as_ref() == local)
}

fn is_end(event: &Event<'static>, local: &[u8]) -> bool {
    matches!(event, Event::End(e) if e.local_name().as_ref() == local)
}

fn attr_value(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Names of all bookmarks, in document order.
pub(crate) fn bookmark_names(events: &[Event<'static>]) -> Vec<String> {
    events
        .iter()
        .filter_map(|ev| marker(ev, b"bookmarkStart"))
        .filter_map(|e| attr_value(e, b"name"))
        .collect()
}

/// Locate a bookmark by exact name. A start without a matching end is not a bookmark.
pub(crate) fn find_bookmark(events: &[Event<'static>], name: &str) -> Option<BookmarkSpan> {
    let (start, id) = events.iter().enumerate().find_map(|(idx, ev)| {
        let e = marker(ev, b"bookmarkStart")?;
        (attr_value(e, b"name").as_deref() == Some(name)).then(|| (idx, attr_value(e, b"id")))
    })?;

    let end = events
        .iter()
        .enumerate()
        .skip(start + 1)
        .find_map(|(idx, ev)| {
            let e = marker(ev, b"bookmarkEnd")?;
            (attr_value(e, b"id") == id).then_some(idx)
        })?;

    Some(BookmarkSpan { start, end })
}

/// Plain text of the bookmarked range, or `None` if the bookmark is absent.
pub(crate) fn bookmark_text(events: &[Event<'static>], name: &str) -> Option<String> {
    let span = find_bookmark(events, name)?;
    Some(plain_text(&events[span.start + 1..span.end]))
}

/// Replace the bookmarked range's text with `text`.
///
/// The first `t` element in the range receives the new text and later ones
/// are removed, so run formatting of the first run carries over. Breaks and
/// tabs inside runs are dropped. A range without text gets a fresh run right
/// after `bookmarkStart`, borrowing properties from an adjacent run. The
/// bookmark markers stay in place. Returns `false` if the bookmark is absent.
pub(crate) fn replace_bookmark_text(events: &mut XmlEvents, name: &str, text: &str) -> bool {
    let Some(span) = find_bookmark(events, name) else {
        return false;
    };

    let prefix = element_prefix(&events[span.start]);
    let placement = run_placement(events, span.start);
    let properties = neighbour_run_properties(events, span);

    let inner: XmlEvents = events.drain(span.start + 1..span.end).collect();
    let mut replacement = Some(text_events(&prefix, text));
    let mut out: XmlEvents = Vec::with_capacity(inner.len());
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut skipping_text = false;

    for event in inner {
        if skipping_text {
            if is_end(&event, b"t") {
                skipping_text = false;
            }
            continue;
        }

        match &event {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                skipping_text = true;
                if let Some(text) = replacement.take() {
                    out.extend(text);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"t" => {
                if let Some(text) = replacement.take() {
                    out.extend(text);
                }
            }
            Event::Empty(e)
                if stack.iter().any(|n| n == b"r")
                    && RUN_BREAKS.contains(&e.local_name().as_ref()) => {}
            Event::Start(e) => {
                stack.push(e.local_name().as_ref().to_vec());
                out.push(event);
            }
            Event::End(_) => {
                stack.pop();
                out.push(event);
            }
            _ => out.push(event),
        }
    }

    if placement == RunPlacement::Nowhere && replacement.is_some() {
        debug!(bookmark = name, "collapsed bookmark between table rows, text not inserted");
    } else if let Some(text) = replacement {
        let run_tag = format!("{prefix}r");
        let mut run: XmlEvents = Vec::new();
        run.push(Event::Start(BytesStart::new(run_tag.clone())));
        run.extend(properties);
        run.extend(text);
        run.push(Event::End(BytesEnd::new(run_tag)));

        if placement == RunPlacement::InNewParagraph {
            let para_tag = format!("{prefix}p");
            run.insert(0, Event::Start(BytesStart::new(para_tag.clone())));
            run.push(Event::End(BytesEnd::new(para_tag)));
        }
        out.splice(0..0, run);
    }

    events.splice(span.start + 1..span.start + 1, out);
    true
}

/// Namespace prefix (with colon) of an element, e.g. `"w:"`.
fn element_prefix(event: &Event<'static>) -> String {
    match event {
        Event::Start(e) | Event::Empty(e) => {
            let qualified = String::from_utf8_lossy(e.name().as_ref()).into_owned();
            match qualified.rfind(':') {
                Some(pos) => qualified[..=pos].to_string(),
                None => String::new(),
            }
        }
        _ => "w:".to_string(),
    }
}

/// `t` elements for `text`, with `br` between lines.
fn text_events(prefix: &str, text: &str) -> XmlEvents {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let text_tag = format!("{prefix}t");
    let mut events = Vec::new();

    for (idx, line) in normalized.split('\n').enumerate() {
        if idx > 0 {
            events.push(Event::Empty(BytesStart::new(format!("{prefix}br"))));
        }
        events.push(Event::Start(
            BytesStart::new(text_tag.clone()).with_attributes([("xml:space", "preserve")]),
        ));
        if !line.is_empty() {
            events.push(Event::Text(BytesText::new(line).into_owned()));
        }
        events.push(Event::End(BytesEnd::new(text_tag.clone())));
    }
    events
}

fn run_placement(events: &[Event<'static>], index: usize) -> RunPlacement {
    let mut stack: Vec<Vec<u8>> = Vec::new();
    for event in &events[..index] {
        match event {
            Event::Start(e) => stack.push(e.local_name().as_ref().to_vec()),
            Event::End(_) => {
                stack.pop();
            }
            _ => {}
        }
    }

    for name in stack.iter().rev() {
        let name = name.as_slice();
        if name == b"p" {
            return RunPlacement::Inline;
        }
        if BLOCK_CONTAINERS.contains(&name) {
            return RunPlacement::InNewParagraph;
        }
        if TABLE_STRUCTURE.contains(&name) {
            return RunPlacement::Nowhere;
        }
    }
    RunPlacement::Inline
}

/// Run properties of the first run after the bookmark, or failing that the
/// last run before it, within the same paragraph.
fn neighbour_run_properties(events: &[Event<'static>], span: BookmarkSpan) -> XmlEvents {
    let after = events[span.end + 1..]
        .iter()
        .take_while(|ev| !is_end(ev, b"p"))
        .position(|ev| is_start(ev, b"r"))
        .map(|offset| span.end + 1 + offset);

    let before = || {
        events[..span.start]
            .iter()
            .rev()
            .take_while(|ev| !is_start(ev, b"p"))
            .position(|ev| is_start(ev, b"r"))
            .map(|offset| span.start - 1 - offset)
    };

    after
        .or_else(before)
        .map(|run| run_properties_at(events, run))
        .unwrap_or_default()
}

fn run_properties_at(events: &[Event<'static>], run: usize) -> XmlEvents {
    let mut iter = events[run + 1..]
        .iter()
        .skip_while(|ev| matches!(ev, Event::Text(t) if t.iter().all(u8::is_ascii_whitespace)));

    match iter.next() {
        Some(ev @ Event::Empty(e)) if e.local_name().as_ref() == b"rPr" => vec![ev.clone()],
        Some(ev @ Event::Start(e)) if e.local_name().as_ref() == b"rPr" => {
            let mut props = vec![ev.clone()];
            for next in iter {
                props.push(next.clone());
                if is_end(next, b"rPr") {
                    break;
                }
            }
            props
        }
        _ => Vec::new(),
    }
}

/// Visible text: paragraphs separated by newlines, `br` as newline, `tab` as tab.
pub(crate) fn plain_text(events: &[Event<'static>]) -> String {
    let mut text = String::new();
    let mut in_text = false;
    let mut run_depth = 0usize;

    for event in events {
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"r" => run_depth += 1,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) if run_depth > 0 => match e.local_name().as_ref() {
                b"br" | b"cr" => text.push('\n'),
                b"tab" => text.push('\t'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                if let Ok(unescaped) = e.unescape() {
                    text.push_str(&unescaped);
                }
            }
            _ => {}
        }
    }

    while text.ends_with('\n') {
        text.pop();
    }
    text
}
