use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall verdict for a page. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Ok,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Ok => "OK",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Ok => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalState {
    SelfReferencing,
    Missing,
    PointsElsewhere,
}

impl CanonicalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalState::SelfReferencing => "self",
            CanonicalState::Missing => "missing",
            CanonicalState::PointsElsewhere => "elsewhere",
        }
    }

    pub fn is_issue(&self) -> bool {
        !matches!(self, CanonicalState::SelfReferencing)
    }
}

impl fmt::Display for CanonicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the audit learned about one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFinding {
    pub url: String,
    /// `None` when the fetch itself failed (network error, timeout).
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    pub word_count: usize,
    pub title: Option<String>,
    pub title_length: usize,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub h1_count: usize,
    pub missing_alt_count: usize,
    pub canonical_url: Option<String>,
    pub canonical_state: CanonicalState,
    pub internal_links: usize,
    pub external_links: usize,
    pub broken_anchors: usize,
    pub severity: Severity,
    pub reasons: Vec<String>,
}

impl PageFinding {
    /// Empty finding for `url`; content fields zeroed or absent.
    pub fn new(url: String, status_code: Option<u16>) -> Self {
        Self {
            url,
            status_code,
            fetch_error: None,
            word_count: 0,
            title: None,
            title_length: 0,
            meta_description: None,
            meta_description_length: 0,
            h1_count: 0,
            missing_alt_count: 0,
            canonical_url: None,
            canonical_state: CanonicalState::Missing,
            internal_links: 0,
            external_links: 0,
            broken_anchors: 0,
            severity: Severity::Ok,
            reasons: Vec::new(),
        }
    }

    /// True when the page could not be fetched or answered outside 2xx/3xx.
    pub fn fetch_failed(&self) -> bool {
        match self.status_code {
            None => true,
            Some(code) => !(200..400).contains(&code),
        }
    }

    pub fn status_display(&self) -> String {
        self.status_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "ERR".to_string())
    }
}
