//! Per-page audit.
//!
//! [`analyze`] turns a fetched page into a [`PageFinding`]. Failed fetches
//! short-circuit into an error finding; successful ones run every check so
//! the finding is complete, appending reasons in a fixed order:
//! status, title, description, H1, thin content, alt text, canonical,
//! anchors.

use crate::config::AuditConfig;
use crate::extract::{PageSignals, extract_signals};
use crate::model::{CanonicalState, PageFinding};
use crate::severity::classify;
use seoaudit_scanner::{FetchResponse, ScanError};
use tracing::debug;
use url::Url;

/// Audit the outcome of fetching `url`.
pub fn analyze_fetch(
    url: &str,
    outcome: &Result<FetchResponse, ScanError>,
    config: &AuditConfig,
) -> PageFinding {
    match outcome {
        Ok(response) => analyze(url, Some(response.status_code), &response.body, config),
        Err(e) => failed_finding(url, None, Some(e.to_string()), config),
    }
}

/// Audit a page given its HTTP status (`None` if the fetch failed) and body.
pub fn analyze(
    url: &str,
    status_code: Option<u16>,
    body: &str,
    config: &AuditConfig,
) -> PageFinding {
    match status_code {
        Some(code) if (200..400).contains(&code) => {}
        _ => return failed_finding(url, status_code, None, config),
    }

    let signals = extract_signals(body);
    let mut finding = PageFinding::new(url.to_string(), status_code);

    check_title(&mut finding, &signals, config);
    check_description(&mut finding, &signals, config);
    check_headings(&mut finding, &signals);
    check_word_count(&mut finding, &signals, config);
    check_images(&mut finding, &signals);
    check_canonical(&mut finding, &signals);
    check_links(&mut finding, &signals);

    finding.severity = classify(&finding, config);
    debug!(
        "Audited {}: {} ({} reason(s))",
        url,
        finding.severity,
        finding.reasons.len()
    );
    finding
}

fn failed_finding(
    url: &str,
    status_code: Option<u16>,
    error: Option<String>,
    config: &AuditConfig,
) -> PageFinding {
    let mut finding = PageFinding::new(url.to_string(), status_code);

    let reason = match (status_code, &error) {
        (Some(code), _) => format!("HTTP {} response", code),
        (None, Some(e)) => format!("Fetch failed: {}", e),
        (None, None) => "Fetch failed".to_string(),
    };
    finding.reasons.push(reason);
    finding.fetch_error = error;
    finding.severity = classify(&finding, config);

    debug!("Fetch failure for {}: {}", url, finding.reasons[0]);
    finding
}

fn check_title(finding: &mut PageFinding, signals: &PageSignals, config: &AuditConfig) {
    let Some(ref title) = signals.title else {
        finding.reasons.push("Missing title".to_string());
        return;
    };

    let len = title.chars().count();
    finding.title = Some(title.clone());
    finding.title_length = len;

    if len < config.title_min {
        finding.reasons.push(format!(
            "Title too short ({} chars, min {})",
            len, config.title_min
        ));
    } else if len > config.title_max {
        finding.reasons.push(format!(
            "Title too long ({} chars, max {})",
            len, config.title_max
        ));
    }
}

fn check_description(finding: &mut PageFinding, signals: &PageSignals, config: &AuditConfig) {
    let Some(ref description) = signals.meta_description else {
        finding.reasons.push("Missing meta description".to_string());
        return;
    };

    let len = description.chars().count();
    finding.meta_description = Some(description.clone());
    finding.meta_description_length = len;

    if len < config.description_min {
        finding.reasons.push(format!(
            "Meta description too short ({} chars, min {})",
            len, config.description_min
        ));
    } else if len > config.description_max {
        finding.reasons.push(format!(
            "Meta description too long ({} chars, max {})",
            len, config.description_max
        ));
    }
}

fn check_headings(finding: &mut PageFinding, signals: &PageSignals) {
    finding.h1_count = signals.h1_texts.len();

    match finding.h1_count {
        0 => finding.reasons.push("Missing H1".to_string()),
        1 => {}
        n => finding.reasons.push(format!("Multiple H1 tags ({})", n)),
    }
}

fn check_word_count(finding: &mut PageFinding, signals: &PageSignals, config: &AuditConfig) {
    finding.word_count = signals.word_count();

    if config.is_thin(finding.word_count) {
        finding.reasons.push(format!(
            "Thin content ({} words, min {})",
            finding.word_count, config.thin_content_threshold
        ));
    }
}

fn check_images(finding: &mut PageFinding, signals: &PageSignals) {
    finding.missing_alt_count = signals.missing_alt_count();

    if finding.missing_alt_count > 0 {
        finding.reasons.push(format!(
            "{} image(s) missing alt text",
            finding.missing_alt_count
        ));
    }
}

fn check_canonical(finding: &mut PageFinding, signals: &PageSignals) {
    let (canonical_url, state) =
        classify_canonical(&finding.url, signals.canonical_href.as_deref());

    match state {
        CanonicalState::SelfReferencing => {}
        CanonicalState::Missing => finding.reasons.push("Missing canonical tag".to_string()),
        CanonicalState::PointsElsewhere => finding.reasons.push(format!(
            "Canonical points elsewhere: {}",
            canonical_url.as_deref().unwrap_or_default()
        )),
    }

    finding.canonical_url = canonical_url;
    finding.canonical_state = state;
}

fn check_links(finding: &mut PageFinding, signals: &PageSignals) {
    let base_url = Url::parse(&finding.url).ok();
    let page_domain = base_url.as_ref().and_then(|u| u.host_str()).map(bare_domain);

    for href in &signals.link_hrefs {
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("javascript:")
        {
            continue;
        }

        if let Some(fragment) = href.strip_prefix('#') {
            if !fragment.is_empty()
                && fragment != "top"
                && !signals.anchor_targets.contains(fragment)
            {
                finding.broken_anchors += 1;
            }
            continue;
        }

        let target = match base_url {
            Some(ref base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        };
        let target_domain = target.as_ref().and_then(|u| u.host_str()).map(bare_domain);

        let external = match (target_domain, &page_domain) {
            (Some(target), Some(page)) => {
                target != *page && !target.ends_with(&format!(".{}", page))
            }
            _ => false,
        };

        if external {
            finding.external_links += 1;
        } else {
            finding.internal_links += 1;
        }
    }

    if finding.broken_anchors > 0 {
        finding.reasons.push(format!(
            "{} broken in-page anchor(s)",
            finding.broken_anchors
        ));
    }
}

/// Resolve a canonical `href` against the page and compare the two.
///
/// Returns the absolute canonical target (if any) and its state. URLs are
/// compared after dropping the fragment and any trailing slash.
pub fn classify_canonical(page_url: &str, href: Option<&str>) -> (Option<String>, CanonicalState) {
    let Some(href) = href.map(str::trim).filter(|h| !h.is_empty()) else {
        return (None, CanonicalState::Missing);
    };

    let target = match Url::parse(page_url) {
        Ok(base) => base.join(href).ok(),
        Err(_) => Url::parse(href).ok(),
    };

    let Some(target) = target else {
        return (Some(href.to_string()), CanonicalState::PointsElsewhere);
    };

    let state = if normalize_url(&target) == normalize_page_url(page_url) {
        CanonicalState::SelfReferencing
    } else {
        CanonicalState::PointsElsewhere
    };

    (Some(target.to_string()), state)
}

fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str().trim_end_matches('/').to_string()
}

fn normalize_page_url(page_url: &str) -> String {
    match Url::parse(page_url) {
        Ok(url) => normalize_url(&url),
        Err(_) => page_url.trim().trim_end_matches('/').to_string(),
    }
}

fn bare_domain(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
