use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::models::Heading;

/// Deepest heading level that receives an anchor id.
pub(crate) const MAX_ANCHOR_DEPTH: u8 = 4;

/// Anchor assigned to one rendered heading, any depth up to
/// [`MAX_ANCHOR_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    pub level: u8,
    pub id: String,
    pub text: String,
}

pub(crate) fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

pub(crate) const fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Walks the markdown event stream in document order and assigns every
/// heading its anchor id. An id already present on the heading (authored
/// `{#...}` attribute) is reused instead of recomputed.
#[must_use]
pub fn heading_anchors(body: &str) -> Vec<HeadingAnchor> {
    let parser = Parser::new_ext(body, markdown_options());
    let mut anchors = Vec::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                let depth = heading_depth(level);
                if depth <= MAX_ANCHOR_DEPTH {
                    current = Some((depth, id.map(|value| value.to_string()), String::new()));
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit, text)) = current.take() {
                    let id = explicit.unwrap_or_else(|| slugify(&text));
                    anchors.push(HeadingAnchor { level, id, text });
                }
            }
            Event::Text(chunk) | Event::Code(chunk) => {
                if let Some((_, _, buffer)) = current.as_mut() {
                    buffer.push_str(&chunk);
                }
            }
            _ => {}
        }
    }
    anchors
}

/// The TOC input sequence: level-2 and level-3 headings only. Level 1 is
/// the article title and stays out.
#[must_use]
pub fn extract_headings(body: &str) -> Vec<Heading> {
    heading_anchors(body)
        .into_iter()
        .filter(|anchor| anchor.level == 2 || anchor.level == 3)
        .map(|anchor| Heading {
            id: anchor.id,
            text: anchor.text,
            level: anchor.level,
        })
        .collect()
}

/// Slug-style identifier from heading text: lowercase, whitespace runs
/// collapse to a single hyphen, everything outside `[0-9a-z_-]` dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        if ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        }
    }
    if pending_hyphen {
        out.push('-');
    }
    out
}
