// HTML signal extraction
//
// Pulls the raw on-page SEO signals out of a document. No rules are applied
// here; see `analyzer` for that. Malformed markup never fails: html5ever
// repairs what it can and anything missing comes back as absent.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_NAMED: LazyLock<Selector> = LazyLock::new(|| selector("meta[name]"));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static LINK_REL: LazyLock<Selector> = LazyLock::new(|| selector("link[rel][href]"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static NAMED_ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[name]"));
static WITH_ID: LazyLock<Selector> = LazyLock::new(|| selector("[id]"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    /// Whitespace-normalised text of the first `<title>`, if non-empty.
    pub title: Option<String>,
    /// First non-blank `content` among `<meta name="description">` tags.
    pub meta_description: Option<String>,
    pub h1_texts: Vec<String>,
    /// One entry per `<img>`: its `alt` attribute, if present.
    pub image_alts: Vec<Option<String>>,
    /// `href` of the first `<link rel="canonical">`.
    pub canonical_href: Option<String>,
    /// Visible text inside `<body>`, scripts and styles excluded.
    pub body_text: String,
    pub link_hrefs: Vec<String>,
    /// Fragment targets: element ids and legacy `<a name>` values.
    pub anchor_targets: HashSet<String>,
}

impl PageSignals {
    pub fn word_count(&self) -> usize {
        self.body_text.split_whitespace().count()
    }

    pub fn missing_alt_count(&self) -> usize {
        self.image_alts
            .iter()
            .filter(|alt| alt.as_deref().is_none_or(|a| a.trim().is_empty()))
            .count()
    }
}

pub fn extract_signals(html: &str) -> PageSignals {
    let document = Html::parse_document(html);

    // SVG and MathML carry their own <title> elements; only the HTML one names the page.
    let title = document
        .select(&TITLE)
        .find(|el| &*el.value().name.ns == HTML_NAMESPACE)
        .map(|el| normalize_space(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let meta_description = document
        .select(&META_NAMED)
        .filter(|el| {
            el.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"))
        })
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_space)
        .find(|d| !d.is_empty());

    let h1_texts = document
        .select(&H1)
        .map(|el| normalize_space(&el.text().collect::<String>()))
        .collect();

    let image_alts = document
        .select(&IMG)
        .map(|el| el.value().attr("alt").map(|a| a.to_string()))
        .collect();

    let canonical_href = document
        .select(&LINK_REL)
        .filter(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .find(|href| !href.is_empty());

    let body_text = document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default();

    let link_hrefs = document
        .select(&ANCHOR)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect();

    let mut anchor_targets: HashSet<String> = document
        .select(&WITH_ID)
        .filter_map(|el| el.value().attr("id"))
        .map(|id| id.to_string())
        .collect();
    anchor_targets.extend(
        document
            .select(&NAMED_ANCHOR)
            .filter_map(|el| el.value().attr("name"))
            .map(|name| name.to_string()),
    );

    PageSignals {
        title,
        meta_description,
        h1_texts,
        image_alts,
        canonical_href,
        body_text,
        link_hrefs,
        anchor_targets,
    }
}

fn visible_text(body: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in body.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });

        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    normalize_space(&text)
}

pub fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>  Widgets   for
  every occasion </title>
  <meta name="Description" content=" Hand-made widgets. ">
  <link rel="stylesheet" href="/style.css">
  <link rel="Canonical" href="https://example.com/widgets">
  <link rel="canonical" href="https://example.com/ignored">
  <script>var words = "these are not visible";</script>
</head>
<body>
  <h1>Widgets</h1>
  <h1>More widgets</h1>
  <p>One two three</p>
  <style>.x { color: red }</style>
  <script>console.log("hidden")</script>
  <noscript>enable javascript please</noscript>
  <img src="a.png" alt="A widget">
  <img src="b.png" alt="  ">
  <img src="c.png">
  <a href="/about">About</a>
  <a href="#section">Jump</a>
  <a name="legacy"></a>
  <div id="section">four five</div>
</body>
</html>"##;

    #[test]
    fn test_extracts_head_signals() {
        let signals = extract_signals(PAGE);

        assert_eq!(signals.title.as_deref(), Some("Widgets for every occasion"));
        assert_eq!(signals.meta_description.as_deref(), Some("Hand-made widgets."));
        assert_eq!(
            signals.canonical_href.as_deref(),
            Some("https://example.com/widgets")
        );
    }

    #[test]
    fn test_counts_headings_and_images() {
        let signals = extract_signals(PAGE);

        assert_eq!(signals.h1_texts, vec!["Widgets", "More widgets"]);
        assert_eq!(signals.image_alts.len(), 3);
        assert_eq!(signals.missing_alt_count(), 2);
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let signals = extract_signals(PAGE);

        assert!(!signals.body_text.contains("console"));
        assert!(!signals.body_text.contains("color"));
        assert!(!signals.body_text.contains("javascript"));
        assert!(!signals.body_text.contains("visible"));
        // Widgets / More widgets / One two three / About / Jump / four five
        assert_eq!(signals.word_count(), 10);
    }

    #[test]
    fn test_links_and_anchor_targets() {
        let signals = extract_signals(PAGE);

        assert_eq!(signals.link_hrefs, vec!["/about", "#section"]);
        assert!(signals.anchor_targets.contains("section"));
        assert!(signals.anchor_targets.contains("legacy"));
    }

    #[test]
    fn test_empty_and_malformed_documents() {
        let empty = extract_signals("");
        assert_eq!(empty.title, None);
        assert_eq!(empty.meta_description, None);
        assert_eq!(empty.word_count(), 0);
        assert!(empty.h1_texts.is_empty());

        let broken = extract_signals("<html><title>Unclosed<body><h1>Head<p>text");
        assert_eq!(broken.canonical_href, None);
        assert_eq!(broken.meta_description, None);
    }

    #[test]
    fn test_svg_title_is_not_the_page_title() {
        let signals = extract_signals(
            r#"<html><head></head><body><h1>Hi</h1>
            <svg viewBox="0 0 10 10"><title>Company logo icon for the header area</title></svg>
            </body></html>"#,
        );
        assert_eq!(signals.title, None);

        let signals = extract_signals(
            r#"<html><head><title>Real page title</title></head><body>
            <svg><title>Icon</title></svg></body></html>"#,
        );
        assert_eq!(signals.title.as_deref(), Some("Real page title"));
    }

    #[test]
    fn test_blank_description_falls_through_to_next() {
        let signals = extract_signals(
            r#"<html><head><meta name="description" content="  ">
            <meta name="description" content="Second tag wins"></head><body></body></html>"#,
        );
        assert_eq!(signals.meta_description.as_deref(), Some("Second tag wins"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let signals = extract_signals(
            r#"<html><head><title>   </title><meta name="description" content="">
            <link rel="canonical" href=" "></head><body></body></html>"#,
        );

        assert_eq!(signals.title, None);
        assert_eq!(signals.meta_description, None);
        assert_eq!(signals.canonical_href, None);
    }
}
