pub mod analyzer;
pub mod audit;
pub mod config;
pub mod extract;
pub mod model;
pub mod report;
pub mod severity;

pub use analyzer::{analyze, analyze_fetch, classify_canonical};
pub use audit::{
    AuditOptions, AuditProgressCallback, DEFAULT_WORKERS, FindingCallback, audit_urls,
    execute_audit,
};
pub use config::{AuditConfig, ConfigError, validate_sitemap_url};
pub use model::{CanonicalState, PageFinding, Severity};
pub use report::{AuditReport, ReportFormat, SeverityCounts, render_report, sort_findings};
pub use severity::classify;
