// Tests for page analysis

use seoaudit_core::analyzer::{analyze, analyze_fetch};
use seoaudit_core::config::AuditConfig;
use seoaudit_core::model::{CanonicalState, Severity};
use seoaudit_scanner::{FetchResponse, ScanError};

const URL: &str = "https://example.com/widgets";

struct PageBuilder {
    title: Option<String>,
    description: Option<String>,
    h1s: Vec<&'static str>,
    words: usize,
    canonical: Option<String>,
    images: Vec<Option<&'static str>>,
    extra_body: &'static str,
}

impl PageBuilder {
    fn healthy() -> Self {
        Self {
            title: Some("t".repeat(45)),
            description: Some("d".repeat(100)),
            h1s: vec!["Widgets"],
            words: 500,
            canonical: Some(URL.to_string()),
            images: Vec::new(),
            extra_body: "",
        }
    }

    fn build(&self) -> String {
        let mut head = String::new();
        if let Some(ref title) = self.title {
            head.push_str(&format!("<title>{}</title>", title));
        }
        if let Some(ref description) = self.description {
            head.push_str(&format!(
                r#"<meta name="description" content="{}">"#,
                description
            ));
        }
        if let Some(ref canonical) = self.canonical {
            head.push_str(&format!(r#"<link rel="canonical" href="{}">"#, canonical));
        }

        let mut body = String::new();
        for h1 in &self.h1s {
            body.push_str(&format!("<h1>{}</h1>", h1));
        }
        // The h1 text counts too; pad the paragraph so the total is exact.
        let h1_words: usize = self.h1s.iter().map(|h| h.split_whitespace().count()).sum();
        let filler = self.words.saturating_sub(h1_words);
        body.push_str(&format!("<p>{}</p>", vec!["lorem"; filler].join(" ")));
        for alt in &self.images {
            match alt {
                Some(alt) => body.push_str(&format!(r#"<img src="x.png" alt="{}">"#, alt)),
                None => body.push_str(r#"<img src="x.png">"#),
            }
        }
        body.push_str(self.extra_body);

        format!(
            "<!DOCTYPE html><html><head>{}</head><body>{}</body></html>",
            head, body
        )
    }
}

// ============================================================================
// Fetch Failures
// ============================================================================

#[test]
fn test_not_found_short_circuits() {
    let html = PageBuilder::healthy().build();
    let finding = analyze(URL, Some(404), &html, &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.reasons, vec!["HTTP 404 response"]);
    assert_eq!(finding.word_count, 0);
    assert_eq!(finding.title, None);
    assert_eq!(finding.h1_count, 0);
}

#[test]
fn test_server_error_short_circuits() {
    let finding = analyze(URL, Some(503), "", &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.reasons, vec!["HTTP 503 response"]);
}

#[test]
fn test_network_failure_has_no_status() {
    let outcome: Result<FetchResponse, ScanError> = Err(ScanError::Timeout(20));
    let finding = analyze_fetch(URL, &outcome, &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.status_code, None);
    assert_eq!(finding.status_display(), "ERR");
    assert!(finding.fetch_error.is_some());
    assert_eq!(finding.reasons.len(), 1);
    assert!(finding.reasons[0].starts_with("Fetch failed: "));
}

#[test]
fn test_analyze_fetch_uses_response_status_and_body() {
    let response = FetchResponse::new(URL.to_string(), 200, PageBuilder::healthy().build());
    let finding = analyze_fetch(URL, &Ok(response), &AuditConfig::default());

    assert_eq!(finding.status_code, Some(200));
    assert_eq!(finding.severity, Severity::Ok);
}

// ============================================================================
// Content Checks
// ============================================================================

#[test]
fn test_healthy_page_is_ok() {
    let finding = analyze(URL, Some(200), &PageBuilder::healthy().build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Ok);
    assert!(finding.reasons.is_empty(), "unexpected: {:?}", finding.reasons);
    assert_eq!(finding.title_length, 45);
    assert_eq!(finding.meta_description_length, 100);
    assert_eq!(finding.h1_count, 1);
    assert_eq!(finding.word_count, 500);
    assert_eq!(finding.canonical_state, CanonicalState::SelfReferencing);
}

#[test]
fn test_thin_page_warns_with_single_reason() {
    let page = PageBuilder {
        words: 120,
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.word_count, 120);
    assert_eq!(finding.reasons, vec!["Thin content (120 words, min 300)"]);
}

#[test]
fn test_missing_title_is_error() {
    let page = PageBuilder {
        title: None,
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.title_length, 0);
    assert_eq!(finding.reasons, vec!["Missing title"]);
}

#[test]
fn test_inline_svg_title_does_not_count_as_page_title() {
    let page = PageBuilder {
        title: None,
        extra_body: "<svg><title>Company logo icon for the header area</title></svg>",
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.title, None);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.reasons, vec!["Missing title"]);
}

#[test]
fn test_missing_h1_is_error() {
    let page = PageBuilder {
        h1s: Vec::new(),
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.reasons, vec!["Missing H1"]);
}

#[test]
fn test_multiple_h1_is_warning() {
    let page = PageBuilder {
        h1s: vec!["One", "Two"],
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.h1_count, 2);
    assert_eq!(finding.reasons, vec!["Multiple H1 tags (2)"]);
}

#[test]
fn test_missing_alt_text_is_warning() {
    let page = PageBuilder {
        images: vec![Some("A widget"), None, Some("")],
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.missing_alt_count, 2);
    assert_eq!(finding.reasons, vec!["2 image(s) missing alt text"]);
}

#[test]
fn test_canonical_elsewhere_is_warning() {
    let page = PageBuilder {
        canonical: Some("https://example.com/gadgets".to_string()),
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.canonical_state, CanonicalState::PointsElsewhere);
    assert_eq!(
        finding.canonical_url.as_deref(),
        Some("https://example.com/gadgets")
    );
    assert_eq!(
        finding.reasons,
        vec!["Canonical points elsewhere: https://example.com/gadgets"]
    );
}

#[test]
fn test_missing_canonical_is_warning() {
    let page = PageBuilder {
        canonical: None,
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.canonical_state, CanonicalState::Missing);
    assert_eq!(finding.reasons, vec!["Missing canonical tag"]);
}

#[test]
fn test_title_length_bounds() {
    let short = PageBuilder {
        title: Some("Widgets".to_string()),
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &short.build(), &AuditConfig::default());
    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.reasons, vec!["Title too short (7 chars, min 30)"]);

    let long = PageBuilder {
        title: Some("t".repeat(61)),
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &long.build(), &AuditConfig::default());
    assert_eq!(finding.reasons, vec!["Title too long (61 chars, max 60)"]);
}

#[test]
fn test_description_length_bounds() {
    let page = PageBuilder {
        description: Some("d".repeat(161)),
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(
        finding.reasons,
        vec!["Meta description too long (161 chars, max 160)"]
    );
}

#[test]
fn test_broken_anchor_is_warning() {
    let page = PageBuilder {
        extra_body: r##"<a href="#nowhere">jump</a>"##,
        words: 499,
        ..PageBuilder::healthy()
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Warn);
    assert_eq!(finding.broken_anchors, 1);
    assert_eq!(finding.reasons, vec!["1 broken in-page anchor(s)"]);
}

// ============================================================================
// Reason Ordering
// ============================================================================

#[test]
fn test_reasons_follow_check_order() {
    let page = PageBuilder {
        title: Some("Short".to_string()),
        description: None,
        h1s: Vec::new(),
        words: 10,
        canonical: None,
        images: vec![None],
        extra_body: "",
    };
    let finding = analyze(URL, Some(200), &page.build(), &AuditConfig::default());

    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(
        finding.reasons,
        vec![
            "Title too short (5 chars, min 30)",
            "Missing meta description",
            "Missing H1",
            "Thin content (10 words, min 300)",
            "1 image(s) missing alt text",
            "Missing canonical tag",
        ]
    );
}

#[test]
fn test_threshold_is_configurable() {
    let page = PageBuilder {
        words: 120,
        ..PageBuilder::healthy()
    };
    let config = AuditConfig::default().with_thin_content_threshold(100);
    let finding = analyze(URL, Some(200), &page.build(), &config);

    assert_eq!(finding.severity, Severity::Ok);
}

#[test]
fn test_analysis_is_deterministic() {
    let html = PageBuilder {
        words: 42,
        images: vec![None],
        ..PageBuilder::healthy()
    }
    .build();
    let config = AuditConfig::default();

    let first = analyze(URL, Some(200), &html, &config);
    let second = analyze(URL, Some(200), &html, &config);
    assert_eq!(first, second);
}
