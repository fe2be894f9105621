use crate::analyzer::analyze_fetch;
use crate::config::{AuditConfig, ConfigError, validate_sitemap_url};
use crate::model::PageFinding;
use crate::report::AuditReport;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use seoaudit_scanner::{Fetch, SitemapResolver};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_WORKERS: usize = 4;

/// Options for configuring an audit run
pub struct AuditOptions {
    pub sitemap_url: String,
    pub config: AuditConfig,
    pub workers: usize,
    pub show_progress_bars: bool,
    /// Checked between sitemap fetches and before each page fetch.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl AuditOptions {
    pub fn new(sitemap_url: impl Into<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            config: AuditConfig::default(),
            workers: DEFAULT_WORKERS,
            show_progress_bars: false,
            cancel: None,
        }
    }
}

/// Callback for reporting audit progress messages
pub type AuditProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback invoked as each page finding completes (in completion order)
pub type FindingCallback = Arc<dyn Fn(&PageFinding) + Send + Sync>;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn page_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Resolve the sitemap tree, audit every page and build the sorted report.
///
/// Only configuration problems are returned as errors, and they are
/// detected before anything is fetched. Unreachable sitemaps and pages end
/// up in the report instead.
pub async fn execute_audit<F: Fetch>(
    fetcher: &F,
    options: AuditOptions,
    progress_callback: Option<AuditProgressCallback>,
) -> Result<AuditReport, ConfigError> {
    let AuditOptions {
        sitemap_url,
        config,
        workers,
        show_progress_bars,
        cancel,
    } = options;

    let root = validate_sitemap_url(&sitemap_url)?;
    config.validate()?;
    if workers == 0 {
        return Err(ConfigError::InvalidWorkers);
    }

    info!("Starting audit of {} with {} workers", root, workers);

    // Resolution
    let resolve_pb = show_progress_bars.then(|| spinner("Reading sitemaps..."));

    let mut resolver = SitemapResolver::new(fetcher);
    if let Some(ref pb) = resolve_pb {
        let pb = pb.clone();
        resolver = resolver.with_progress_callback(Arc::new(move |url: &str, found: usize| {
            pb.set_message(format!("Reading sitemap {} ({} pages so far)", url, found));
        }));
    }
    if let Some(ref flag) = cancel {
        resolver = resolver.with_cancel_flag(flag.clone());
    }

    let resolution = resolver.resolve(root.as_str()).await;

    if let Some(pb) = resolve_pb {
        pb.finish_and_clear();
    }
    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Found {} page(s) in {} sitemap(s)",
            resolution.urls.len(),
            resolution.sitemaps_visited
        ));
        for error in &resolution.errors {
            callback(format!(
                "[!] Could not read sitemap {}: {}",
                error.sitemap_url, error.reason
            ));
        }
    }

    // Page audits
    let page_pb = show_progress_bars.then(|| page_bar(resolution.urls.len()));
    let on_finding: Option<FindingCallback> = page_pb.clone().map(|pb| {
        Arc::new(move |finding: &PageFinding| {
            pb.set_message(finding.url.clone());
            pb.inc(1);
        }) as FindingCallback
    });

    let findings = audit_urls(
        fetcher,
        &resolution.urls,
        &config,
        workers,
        cancel.as_deref(),
        on_finding,
    )
    .await;

    if let Some(pb) = page_pb {
        pb.finish_and_clear();
    }

    let skipped = resolution.urls.len() - findings.len();
    let mut report = AuditReport::new(root.as_str(), findings, resolution);
    if skipped > 0 {
        warn!("Audit cancelled, {} page(s) not audited", skipped);
        report.cancelled = true;
    }

    info!(
        "Audit complete: {} error, {} warn, {} ok",
        report.counts.error, report.counts.warn, report.counts.ok
    );

    Ok(report)
}

/// Fetch and analyze `urls` with at most `workers` requests in flight.
///
/// Findings come back in completion order; callers sort them. Pages not yet
/// started when `cancel` is set are skipped.
pub async fn audit_urls<F: Fetch>(
    fetcher: &F,
    urls: &[String],
    config: &AuditConfig,
    workers: usize,
    cancel: Option<&AtomicBool>,
    on_finding: Option<FindingCallback>,
) -> Vec<PageFinding> {
    let total = urls.len();
    let completed = AtomicUsize::new(0);

    let results: Vec<Option<PageFinding>> = stream::iter(urls)
        .map(|url| {
            let completed = &completed;
            let on_finding = on_finding.clone();

            async move {
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    return None;
                }

                let outcome = fetcher.fetch(url).await;
                let finding = analyze_fetch(url, &outcome, config);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                info!("[{}/{}] {} {}", done, total, finding.severity, url);
                if let Some(ref callback) = on_finding {
                    callback(&finding);
                }

                Some(finding)
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    results.into_iter().flatten().collect()
}
