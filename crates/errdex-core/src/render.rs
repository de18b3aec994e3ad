use pulldown_cmark::{CowStr, Event, Parser, Tag, TagEnd, html};

use crate::headings::{MAX_ANCHOR_DEPTH, extract_headings, heading_anchors, heading_depth, markdown_options};
use crate::models::Heading;

#[derive(Debug, Clone)]
pub struct RenderedArticle {
    pub html: String,
    /// The level-2/3 anchor sequence exposed to the TOC, in document order.
    pub headings: Vec<Heading>,
}

/// Renders an article body to HTML with stable anchor ids on every heading.
/// External links open in a new tab; unsafe destinations are neutralized;
/// raw HTML is downgraded to text.
#[must_use]
pub fn render_article_html(body: &str) -> RenderedArticle {
    let anchors = heading_anchors(body);
    let mut anchor_queue = anchors.iter();
    let mut inside_external_link = false;

    let mut events: Vec<Event<'_>> = Vec::new();
    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let assigned = if heading_depth(level) <= MAX_ANCHOR_DEPTH {
                    anchor_queue
                        .next()
                        .map(|anchor| CowStr::from(anchor.id.clone()))
                } else {
                    None
                };
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: assigned.or(id),
                    classes,
                    attrs,
                }));
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = sanitize_link_destination(dest_url);
                if is_external_destination(&dest_url) {
                    inside_external_link = true;
                    events.push(Event::Html(CowStr::from(format!(
                        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                        escape_attribute(&dest_url)
                    ))));
                } else {
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
            }
            Event::End(TagEnd::Link) if inside_external_link => {
                inside_external_link = false;
                events.push(Event::Html(CowStr::from("</a>")));
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: sanitize_image_source(dest_url),
                    title,
                    id,
                }));
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                events.push(Event::Text(CowStr::from(raw.into_string())));
            }
            other => events.push(other),
        }
    }

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    RenderedArticle {
        html: output,
        headings: extract_headings(body),
    }
}

fn is_external_destination(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn sanitize_link_destination(dest_url: CowStr<'_>) -> CowStr<'static> {
    let value = dest_url.into_string();
    if is_safe_destination(&value, true) {
        CowStr::from(value)
    } else {
        CowStr::from("#")
    }
}

fn sanitize_image_source(dest_url: CowStr<'_>) -> CowStr<'static> {
    let value = dest_url.into_string();
    if is_safe_destination(&value, false) {
        CowStr::from(value)
    } else {
        CowStr::from("")
    }
}

fn is_safe_destination(value: &str, allow_mailto: bool) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("//") {
        return false;
    }
    if lower.starts_with('#')
        || lower.starts_with('/')
        || lower.starts_with("./")
        || lower.starts_with("../")
    {
        return true;
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }
    if allow_mailto && lower.starts_with("mailto:") {
        return true;
    }

    !lower.contains(':')
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_receive_anchor_ids() {
        let rendered = render_article_html("## Rate Limits!!\n\ntext\n");
        assert!(rendered.html.contains("<h2 id=\"rate-limits\">"));
        assert_eq!(rendered.headings.len(), 1);
        assert_eq!(rendered.headings[0].id, "rate-limits");
    }

    #[test]
    fn external_links_open_in_new_tab() {
        let rendered = render_article_html("[status](https://status.example.com)\n");
        assert!(rendered.html.contains("target=\"_blank\""));
        assert!(rendered.html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn internal_links_stay_plain() {
        let rendered = render_article_html("[other issue](/provider/openai/issue/timeout)\n");
        assert!(rendered.html.contains("href=\"/provider/openai/issue/timeout\""));
        assert!(!rendered.html.contains("target=\"_blank\""));
    }

    #[test]
    fn unsafe_link_destinations_are_neutralized() {
        let rendered = render_article_html("[bad](javascript:alert(1))\n");
        assert!(rendered.html.contains("href=\"#\""));
        assert!(!rendered.html.contains("javascript:"));
    }

    #[test]
    fn raw_html_is_downgraded_to_text() {
        let rendered = render_article_html("Hello<script>alert(1)</script>\n");
        assert!(!rendered.html.contains("<script>"));
        assert!(rendered.html.contains("alert(1)"));
    }
}
