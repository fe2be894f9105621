use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use seoaudit_core::audit::{AuditOptions, execute_audit};
use seoaudit_core::config::{AuditConfig, validate_sitemap_url};
use seoaudit_core::report::{AuditReport, ReportFormat, render_report, save_report};
use seoaudit_scanner::{HttpFetcher, SitemapResolver};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_ERRORS_FOUND: i32 = 2;

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "seoaudit".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!("{}", "sitemap-driven technical SEO auditor".bright_black());
    eprintln!();
}

/// Map `-v` occurrences to a log level; warnings only by default.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_tracing(verbosity: u8) {
    // Ignore the error if a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level_for_verbosity(verbosity))
        .with_target(false)
        .try_init();
}

/// Expand a leading `~` or `$VAR` in a user-supplied output path
pub fn expand_output_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand output path '{}'", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

pub fn parse_format(raw: &str) -> Result<ReportFormat> {
    ReportFormat::from_str(raw).ok_or_else(|| anyhow!("Unknown report format '{}'", raw))
}

pub fn exit_code_for(report: &AuditReport) -> i32 {
    if report.has_errors() {
        EXIT_ERRORS_FOUND
    } else {
        EXIT_OK
    }
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

fn build_fetcher(sub_matches: &ArgMatches) -> Result<HttpFetcher> {
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&20);
    let user_agent = sub_matches
        .get_one::<String>("user-agent")
        .map(String::as_str)
        .unwrap_or(seoaudit_scanner::fetcher::DEFAULT_USER_AGENT);

    HttpFetcher::with_settings(timeout, user_agent).context("Failed to build HTTP client")
}

/// Flag that flips to `true` on the first Ctrl-C.
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let signal_flag = flag.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} Cancelling, finishing in-flight requests...",
                "⚠".yellow().bold()
            );
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    flag
}

pub fn print_summary(report: &AuditReport) {
    eprintln!();
    print_divider();
    eprintln!("{}", "  AUDIT SUMMARY".bright_white().bold());
    print_divider();
    eprintln!(
        "{} Sitemaps read: {}   Pages discovered: {}",
        "→".blue(),
        report.sitemaps_visited.to_string().bright_white(),
        report.pages_discovered.to_string().bright_white()
    );
    eprintln!(
        "  {} {}   {} {}   {} {}",
        "ERROR".red().bold(),
        report.counts.error,
        "WARN".yellow().bold(),
        report.counts.warn,
        "OK".green().bold(),
        report.counts.ok
    );

    if !report.resolution_errors.is_empty() {
        eprintln!();
        eprintln!(
            "{} {} sitemap(s) could not be resolved:",
            "⚠".yellow().bold(),
            report.resolution_errors.len()
        );
        for error in &report.resolution_errors {
            eprintln!(
                "  {} {} {}",
                "•".yellow(),
                error.sitemap_url.bright_white(),
                format!("({})", error.reason).bright_black()
            );
        }
    }

    if report.cancelled {
        eprintln!();
        eprintln!("{} Audit cancelled, results are partial", "⚠".yellow().bold());
    }
    print_divider();
    eprintln!();
}

pub async fn handle_audit(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    match run_audit(sub_matches, quiet).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            EXIT_FAILURE
        }
    }
}

async fn run_audit(sub_matches: &ArgMatches, quiet: bool) -> Result<i32> {
    let sitemap = sub_matches
        .get_one::<String>("sitemap")
        .ok_or_else(|| anyhow!("--sitemap is required"))?;
    let threshold = *sub_matches.get_one::<usize>("thin-threshold").unwrap_or(&300);
    let threads = *sub_matches.get_one::<usize>("threads").unwrap_or(&4);
    let format = parse_format(
        sub_matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text"),
    )?;
    let output = sub_matches
        .get_one::<String>("output")
        .map(|raw| expand_output_path(raw))
        .transpose()?;

    let fetcher = build_fetcher(sub_matches)?;

    if !quiet {
        eprintln!("{} Auditing {}", "→".blue(), sitemap.bright_white());
        eprintln!(
            "{} Workers: {}   Thin content threshold: {} words",
            "→".blue(),
            threads,
            threshold
        );
        eprintln!();
    }

    let options = AuditOptions {
        sitemap_url: sitemap.clone(),
        config: AuditConfig::default().with_thin_content_threshold(threshold),
        workers: threads,
        show_progress_bars: !quiet,
        cancel: Some(cancel_on_ctrl_c()),
    };

    let progress_callback: Option<seoaudit_core::AuditProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| eprintln!("{}", msg)))
    };

    let report = execute_audit(&fetcher, options, progress_callback).await?;

    let content = render_report(&report, format).context("Failed to render report")?;

    match output {
        Some(path) => {
            save_report(&content, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => print!("{}", content),
    }

    if !quiet {
        print_summary(&report);
    }

    Ok(exit_code_for(&report))
}

pub async fn handle_resolve(sub_matches: &ArgMatches, quiet: bool) -> i32 {
    match run_resolve(sub_matches, quiet).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            EXIT_FAILURE
        }
    }
}

async fn run_resolve(sub_matches: &ArgMatches, quiet: bool) -> Result<i32> {
    let sitemap = sub_matches
        .get_one::<String>("sitemap")
        .ok_or_else(|| anyhow!("--sitemap is required"))?;
    let root = validate_sitemap_url(sitemap)?;
    let fetcher = build_fetcher(sub_matches)?;

    let resolution = SitemapResolver::new(&fetcher)
        .with_cancel_flag(cancel_on_ctrl_c())
        .resolve(root.as_str())
        .await;

    for url in &resolution.urls {
        println!("{}", url);
    }

    if !quiet {
        eprintln!();
        eprintln!(
            "{} {} page(s) from {} sitemap(s)",
            "✓".green().bold(),
            resolution.urls.len(),
            resolution.sitemaps_visited
        );
    }
    for error in &resolution.errors {
        eprintln!(
            "{} {} {}",
            "✗".red().bold(),
            error.sitemap_url,
            format!("({})", error.reason).bright_black()
        );
    }
    if resolution.cancelled {
        eprintln!("{} Resolution cancelled, list is partial", "⚠".yellow().bold());
    }

    Ok(EXIT_OK)
}
