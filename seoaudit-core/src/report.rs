// Report generation from audit findings

use crate::model::{PageFinding, Severity};
use serde::{Deserialize, Serialize};
use seoaudit_scanner::{Resolution, ResolutionError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const COLUMNS: [&str; 10] = [
    "Severity",
    "URL",
    "Status Code",
    "Word Count",
    "Title Length",
    "Meta Description Length",
    "H1 Count",
    "Missing Alt Count",
    "Canonical State",
    "Reasons",
];

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "md",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warn: usize,
    pub ok: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[PageFinding]) -> Self {
        let mut counts = SeverityCounts::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => counts.error += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Ok => counts.ok += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.error + self.warn + self.ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub sitemap_url: String,
    /// RFC 3339 timestamp of report creation.
    pub generated_at: String,
    pub sitemaps_visited: usize,
    pub pages_discovered: usize,
    pub counts: SeverityCounts,
    /// Sorted worst first, then by URL.
    pub findings: Vec<PageFinding>,
    pub resolution_errors: Vec<ResolutionError>,
    pub cancelled: bool,
}

impl AuditReport {
    pub fn new(sitemap_url: &str, findings: Vec<PageFinding>, resolution: Resolution) -> Self {
        let findings = sort_findings(findings);
        Self {
            sitemap_url: sitemap_url.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            sitemaps_visited: resolution.sitemaps_visited,
            pages_discovered: resolution.urls.len(),
            counts: SeverityCounts::from_findings(&findings),
            findings,
            resolution_errors: resolution.errors,
            cancelled: resolution.cancelled,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.error > 0
    }
}

/// Order findings for the report: ERROR, then WARN, then OK; URL within each.
pub fn sort_findings(mut findings: Vec<PageFinding>) -> Vec<PageFinding> {
    findings.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| a.url.cmp(&b.url))
    });
    findings
}

pub fn render_report(report: &AuditReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
        ReportFormat::Csv => Ok(generate_csv_report(&report.findings)),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

fn row(finding: &PageFinding) -> [String; 10] {
    [
        finding.severity.to_string(),
        finding.url.clone(),
        finding.status_display(),
        finding.word_count.to_string(),
        finding.title_length.to_string(),
        finding.meta_description_length.to_string(),
        finding.h1_count.to_string(),
        finding.missing_alt_count.to_string(),
        finding.canonical_state.to_string(),
        finding.reasons.join("; "),
    ]
}

pub fn generate_text_report(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push_str("                          TECHNICAL SEO AUDIT REPORT\n");
    out.push_str(RULE);
    out.push('\n');

    out.push_str(&format!("Sitemap:          {}\n", report.sitemap_url));
    out.push_str(&format!("Generated:        {}\n", report.generated_at));
    out.push_str(&format!("Sitemaps read:    {}\n", report.sitemaps_visited));
    out.push_str(&format!("Pages discovered: {}\n", report.pages_discovered));
    out.push_str(&format!("Pages audited:    {}\n", report.counts.total()));
    if report.cancelled {
        out.push_str("Status:           CANCELLED (partial results)\n");
    }
    out.push('\n');

    out.push_str(RULE);
    out.push_str("SUMMARY\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("  [ERROR] {}\n", report.counts.error));
    out.push_str(&format!("  [WARN]  {}\n", report.counts.warn));
    out.push_str(&format!("  [OK]    {}\n", report.counts.ok));
    out.push('\n');

    if !report.resolution_errors.is_empty() {
        out.push_str(RULE);
        out.push_str("UNRESOLVED SITEMAPS\n");
        out.push_str(RULE);
        out.push('\n');
        for error in &report.resolution_errors {
            out.push_str(&format!("  {}\n", error.sitemap_url));
            out.push_str(&wrap_text(&error.reason, 80, "      "));
        }
        out.push('\n');
    }

    if !report.findings.is_empty() {
        out.push_str(RULE);
        out.push_str("PAGES\n");
        out.push_str(RULE);
        out.push('\n');

        for finding in &report.findings {
            out.push_str(&format!("[{}] {}\n", finding.severity, finding.url));
            out.push_str(&format!(
                "  status {} | words {} | title {} | description {} | h1 {} | missing alt {} | canonical {}\n",
                finding.status_display(),
                finding.word_count,
                finding.title_length,
                finding.meta_description_length,
                finding.h1_count,
                finding.missing_alt_count,
                finding.canonical_state
            ));
            for reason in &finding.reasons {
                out.push_str(&wrap_text(&format!("- {}", reason), 80, "  "));
            }
            out.push('\n');
        }
    }

    out.push_str(RULE);
    out.push_str("                                End of Report\n");
    out.push_str(RULE);

    out
}

pub fn generate_json_report(report: &AuditReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "seoaudit",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": report.generated_at,
                "format": "json",
            },
            "sitemap": {
                "url": report.sitemap_url,
                "sitemaps_visited": report.sitemaps_visited,
                "pages_discovered": report.pages_discovered,
                "unresolved": report.resolution_errors,
            },
            "summary": {
                "pages_audited": report.counts.total(),
                "severity_breakdown": report.counts,
                "cancelled": report.cancelled,
            },
            "findings": report.findings,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// One header row plus one row per finding, RFC 4180 quoting.
pub fn generate_csv_report(findings: &[PageFinding]) -> String {
    let mut out = String::new();
    out.push_str(&csv_line(COLUMNS.iter().map(|c| c.to_string())));
    for finding in findings {
        out.push_str(&csv_line(row(finding).into_iter()));
    }
    out
}

fn csv_line(fields: impl Iterator<Item = String>) -> String {
    let mut line = fields.map(|f| csv_escape(&f)).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn generate_markdown_report(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str("# Technical SEO Audit\n\n");
    out.push_str(&format!("- **Sitemap:** {}\n", report.sitemap_url));
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    out.push_str(&format!(
        "- **Pages:** {} discovered, {} audited\n",
        report.pages_discovered,
        report.counts.total()
    ));
    if report.cancelled {
        out.push_str("- **Status:** cancelled, results are partial\n");
    }
    out.push('\n');

    out.push_str("## Summary\n\n");
    out.push_str("| ERROR | WARN | OK |\n|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} |\n\n",
        report.counts.error, report.counts.warn, report.counts.ok
    ));

    if !report.resolution_errors.is_empty() {
        out.push_str("## Unresolved sitemaps\n\n");
        for error in &report.resolution_errors {
            out.push_str(&format!("- `{}`: {}\n", error.sitemap_url, error.reason));
        }
        out.push('\n');
    }

    out.push_str("## Pages\n\n");
    out.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(COLUMNS.len())));
    for finding in &report.findings {
        let cells: Vec<String> = row(finding)
            .iter()
            .map(|cell| cell.replace('|', "\\|"))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
