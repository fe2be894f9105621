// Audit configuration and validation

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_THIN_CONTENT_THRESHOLD: usize = 300;
pub const TITLE_MIN_LEN: usize = 30;
pub const TITLE_MAX_LEN: usize = 60;
pub const DESCRIPTION_MIN_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 160;

/// Errors that prevent an audit from starting. Nothing else is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid sitemap URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("Unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Invalid thin content threshold {0} (must be at least 1)")]
    InvalidThreshold(usize),

    #[error("Invalid {0} length range {1}..={2}")]
    InvalidRange(&'static str, usize, usize),

    #[error("Worker count must be at least 1")]
    InvalidWorkers,
}

/// Thresholds used by the page analyzer and the severity classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Pages with fewer visible words than this are thin content.
    pub thin_content_threshold: usize,
    pub title_min: usize,
    pub title_max: usize,
    pub description_min: usize,
    pub description_max: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            thin_content_threshold: DEFAULT_THIN_CONTENT_THRESHOLD,
            title_min: TITLE_MIN_LEN,
            title_max: TITLE_MAX_LEN,
            description_min: DESCRIPTION_MIN_LEN,
            description_max: DESCRIPTION_MAX_LEN,
        }
    }
}

impl AuditConfig {
    pub fn with_thin_content_threshold(mut self, threshold: usize) -> Self {
        self.thin_content_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thin_content_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(self.thin_content_threshold));
        }
        if self.title_min > self.title_max {
            return Err(ConfigError::InvalidRange(
                "title",
                self.title_min,
                self.title_max,
            ));
        }
        if self.description_min > self.description_max {
            return Err(ConfigError::InvalidRange(
                "meta description",
                self.description_min,
                self.description_max,
            ));
        }
        Ok(())
    }

    pub fn title_in_range(&self, len: usize) -> bool {
        (self.title_min..=self.title_max).contains(&len)
    }

    pub fn description_in_range(&self, len: usize) -> bool {
        (self.description_min..=self.description_max).contains(&len)
    }

    pub fn is_thin(&self, word_count: usize) -> bool {
        word_count < self.thin_content_threshold
    }
}

/// Parse and check the root sitemap URL before anything is fetched.
pub fn validate_sitemap_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(
            raw.to_string(),
            "missing host".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuditConfig::default();
        assert_eq!(config.thin_content_threshold, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config = AuditConfig::default().with_thin_content_threshold(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(0)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let config = AuditConfig {
            title_min: 70,
            ..AuditConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange("title", 70, 60))
        ));
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let config = AuditConfig::default();
        assert!(config.title_in_range(30));
        assert!(config.title_in_range(60));
        assert!(!config.title_in_range(29));
        assert!(!config.title_in_range(61));
        assert!(config.description_in_range(50));
        assert!(config.description_in_range(160));
        assert!(!config.description_in_range(161));
    }

    #[test]
    fn test_validate_sitemap_url() {
        assert!(validate_sitemap_url("https://example.com/sitemap.xml").is_ok());
        assert!(matches!(
            validate_sitemap_url("ftp://example.com/sitemap.xml"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_sitemap_url("example.com/sitemap.xml"),
            Err(ConfigError::InvalidUrl(_, _))
        ));
    }
}
