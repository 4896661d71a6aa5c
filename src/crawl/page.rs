// src/crawl/page.rs
// =============================================================================
// Pulls link candidates out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Never fails: broken markup just yields fewer elements
//
// Two families of attributes are collected:
// - hyperlinks:         <a href>
// - embedded resources: <img src>, <img data-src>, <embed src>, <object data>
//
// For each one we also keep the text around it (used as the asset
// description) and whether it looks like a pagination control. Resolving and
// classifying happen later; this module only reads the DOM.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

/// Longest description kept on an asset record (in characters).
pub const DESCRIPTION_MAX_CHARS: usize = 120;

// Class/id/aria-label fragments used by pagination containers
const PAGINATION_CONTAINER_MARKERS: &[&str] = &[
    "pagination",
    "pager",
    "paging",
    "page-numbers",
    "nav-links",
];

// Link text meaning "next page" / "previous page" in a few languages
const PAGINATION_TEXT_MARKERS: &[&str] = &[
    "next",
    "previous",
    "prev",
    "suivant",
    "précédent",
    "precedent",
    "siguiente",
    "anterior",
    "weiter",
    "zurück",
    "»",
    "«",
    "›",
    "‹",
];

/// Where in the markup a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// `<a href>`: may be navigated
    Anchor,
    /// `<img>`, `<embed>`, `<object>`: a resource, never navigated
    Embedded,
}

/// A link exactly as it appears in the page, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub reference: String,
    pub source: LinkSource,
    /// Contextual text (link text, alt text or surrounding text), truncated
    pub context: String,
    /// Structural hint that this is a next/previous/numbered page control
    pub pagination_hint: bool,
}

// Extracts every hyperlink and embedded-resource reference from a page
//
// Parameters:
//   html: the HTML body (borrowed)
//
// Returns: candidates in document order (an <img> with both src and data-src
// yields src first). Empty or unusable references (#fragments, javascript:,
// mailto:) are dropped.
pub fn extract_links(html: &str) -> Vec<RawLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let candidates = selector("a[href], img[src], img[data-src], embed[src], object[data]");
    for element in document.select(&candidates) {
        match element.value().name() {
            "a" => {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                if !is_followable_reference(href) {
                    continue;
                }

                let text = element_text(&element);
                links.push(RawLink {
                    reference: href.trim().to_string(),
                    source: LinkSource::Anchor,
                    pagination_hint: has_pagination_hint(&element, &text),
                    context: anchor_context(&element, &text),
                });
            }
            name => {
                let attrs: &[&str] = match name {
                    "img" => &["src", "data-src"],
                    "embed" => &["src"],
                    _ => &["data"],
                };
                for attr in attrs {
                    let Some(reference) = element.value().attr(attr) else {
                        continue;
                    };
                    if !is_followable_reference(reference) {
                        continue;
                    }
                    links.push(RawLink {
                        reference: reference.trim().to_string(),
                        source: LinkSource::Embedded,
                        pagination_hint: false,
                        context: resource_context(&element),
                    });
                }
            }
        }
    }

    links
}

// Selectors here are string constants, so a parse failure is a programmer error
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

// Skip anchors, data URIs and special protocols up front
fn is_followable_reference(reference: &str) -> bool {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return false;
    }
    let lower = reference.to_ascii_lowercase();
    !["mailto:", "tel:", "javascript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

// Whitespace-collapsed text content of an element
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// Nearest ancestor element with some text in it
fn ancestor_text(element: &ElementRef) -> Option<String> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|ancestor| element_text(&ancestor))
        .find(|text| !text.is_empty())
}

fn anchor_context(element: &ElementRef, text: &str) -> String {
    let context = if !text.is_empty() {
        text.to_string()
    } else if let Some(title) = element.value().attr("title") {
        title.trim().to_string()
    } else {
        ancestor_text(element).unwrap_or_default()
    };
    truncate_description(&context)
}

fn resource_context(element: &ElementRef) -> String {
    let attr_text = ["alt", "title"]
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty());

    let context = match attr_text {
        Some(value) => value.to_string(),
        None => ancestor_text(element).unwrap_or_default(),
    };
    truncate_description(&context)
}

// A link looks like pagination when:
// - it has rel="next"/"prev", or
// - it (or an ancestor) carries a pagination class/id/aria-label, or
// - its text is a next/previous marker or a bare page number
fn has_pagination_hint(element: &ElementRef, text: &str) -> bool {
    if let Some(rel) = element.value().attr("rel") {
        let rel = rel.to_ascii_lowercase();
        if rel.split_whitespace().any(|r| r == "next" || r == "prev") {
            return true;
        }
    }

    let in_container = std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            ["class", "id", "aria-label"]
                .iter()
                .filter_map(|name| el.value().attr(name))
                .any(|value| {
                    let value = value.to_lowercase();
                    PAGINATION_CONTAINER_MARKERS
                        .iter()
                        .any(|marker| value.contains(marker))
                })
        });
    if in_container {
        return true;
    }

    let text = text.to_lowercase();
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    PAGINATION_TEXT_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// Cuts text to [`DESCRIPTION_MAX_CHARS`] characters, marking the cut with "...".
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_MAX_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(DESCRIPTION_MAX_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_anchor_with_text() {
        let links = extract_links(r#"<a href="/foo.png">wireframe</a>"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].reference, "/foo.png");
        assert_eq!(links[0].source, LinkSource::Anchor);
        assert_eq!(links[0].context, "wireframe");
        assert!(!links[0].pagination_hint);
    }

    #[test]
    fn test_extracts_image_sources_with_alt_text() {
        let html = r#"
            <div><img src="/shots/home.png" alt="Home screen"></div>
            <img data-src="/lazy.jpg">
            <embed src="/spec.pdf">
        "#;
        let links = extract_links(html);
        let refs: Vec<_> = links.iter().map(|l| l.reference.as_str()).collect();
        assert_eq!(refs, vec!["/shots/home.png", "/lazy.jpg", "/spec.pdf"]);
        assert!(links.iter().all(|l| l.source == LinkSource::Embedded));
        assert_eq!(links[0].context, "Home screen");
    }

    #[test]
    fn test_anchors_and_resources_keep_document_order() {
        let html = r#"
            <img src="/first.png" alt="First">
            <a href="/second.pdf">Second</a>
            <object data="/third.pdf"></object>
            <a href="/fourth/">Fourth</a>
            <img src="/fifth.png" data-src="/fifth-full.png">
        "#;
        let references: Vec<_> = extract_links(html)
            .into_iter()
            .map(|link| (link.reference, link.source))
            .collect();

        assert_eq!(
            references,
            vec![
                ("/first.png".to_string(), LinkSource::Embedded),
                ("/second.pdf".to_string(), LinkSource::Anchor),
                ("/third.pdf".to_string(), LinkSource::Embedded),
                ("/fourth/".to_string(), LinkSource::Anchor),
                ("/fifth.png".to_string(), LinkSource::Embedded),
                ("/fifth-full.png".to_string(), LinkSource::Embedded),
            ]
        );
    }

    #[test]
    fn test_image_without_alt_uses_surrounding_text() {
        let html = r#"<figure><img src="/a.png"><figcaption>Login flow</figcaption></figure>"#;
        let links = extract_links(html);
        assert_eq!(links[0].context, "Login flow");
    }

    #[test]
    fn test_skips_fragments_and_special_protocols() {
        let html = r##"
            <a href="#top">Top</a>
            <a href="mailto:a@gytx.dev">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="">Empty</a>
            <img src="data:image/png;base64,AAAA">
        "##;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_pagination_hint_from_text() {
        let links = extract_links(r#"<a href="?page=2">Suivant</a>"#);
        assert!(links[0].pagination_hint);

        let numbered = extract_links(r#"<a href="?page=3">3</a>"#);
        assert!(numbered[0].pagination_hint);
    }

    #[test]
    fn test_pagination_hint_from_container_and_rel() {
        let html = r#"
            <ul class="Pagination"><li><a href="/list/page/2">Go</a></li></ul>
            <a rel="next" href="/list?p=2">More</a>
            <a href="/about/">About us</a>
        "#;
        let links = extract_links(html);
        assert!(links[0].pagination_hint);
        assert!(links[1].pagination_hint);
        assert!(!links[2].pagination_hint);
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let links = extract_links(r#"<div><a href="/a/">A<p><a href="/b/">B"#);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_truncate_description() {
        let long = "x".repeat(500);
        let cut = truncate_description(&long);
        assert_eq!(cut.chars().count(), DESCRIPTION_MAX_CHARS);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_description("short"), "short");
    }
}
