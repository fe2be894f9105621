//! Sitemap parsing and recursive resolution.
//!
//! A sitemap document is either a `<sitemapindex>` listing further sitemaps
//! or a `<urlset>` listing pages. [`SitemapResolver`] walks the whole tree
//! with an explicit work queue and flattens it into a deduplicated list of
//! page URLs. A branch that cannot be fetched or parsed is recorded as a
//! [`ResolutionError`] and skipped; it never aborts the walk.

use crate::error::{Result, ScanError};
use crate::fetcher::Fetch;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use url::Url;

/// Called before each sitemap fetch with the sitemap URL and the number of
/// page URLs discovered so far.
pub type ResolveProgressCallback = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// Parsed form of a single sitemap document, keyed by its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: `<loc>` values of its `<sitemap>` entries.
    Index(Vec<String>),
    /// `<urlset>`: `<loc>` values of its `<url>` entries.
    UrlSet(Vec<String>),
    /// Any other root element, with every `<loc>` found in the document.
    Unknown { root: String, locs: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionError {
    pub sitemap_url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Page URLs in first-discovery order, each exactly once.
    pub urls: Vec<String>,
    pub errors: Vec<ResolutionError>,
    pub sitemaps_visited: usize,
    pub cancelled: bool,
}

/// Parse sitemap XML and classify it by its root element.
///
/// Namespace prefixes are ignored, so `<urlset xmlns="...">` and
/// `<sm:urlset>` are equivalent. Only a `<loc>` directly inside `<url>` or
/// `<sitemap>` counts, which keeps extension entries such as `<image:loc>`
/// out of the page list.
///
/// # Errors
///
/// Returns [`ScanError::ParseError`] for malformed XML, an unclosed root,
/// or a document with no root element at all.
pub fn parse_sitemap_document(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<String> = None;
    // (parent element, loc text)
    let mut locs: Vec<(String, String)> = Vec::new();
    let mut current_loc: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(e.local_name().as_ref());
                if stack.is_empty() {
                    if root.is_some() {
                        return Err(ScanError::ParseError(
                            "multiple root elements".to_string(),
                        ));
                    }
                    root = Some(name.clone());
                }
                if name == "loc" {
                    current_loc = Some(String::new());
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() && root.is_none() {
                    root = Some(element_name(e.local_name().as_ref()));
                }
            }
            Ok(Event::End(_)) => {
                let Some(name) = stack.pop() else {
                    return Err(ScanError::ParseError("unbalanced end tag".to_string()));
                };
                if name == "loc"
                    && let Some(text) = current_loc.take()
                {
                    let parent = stack.last().cloned().unwrap_or_default();
                    let text = text.trim();
                    if !text.is_empty() {
                        locs.push((parent, text.to_string()));
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut loc) = current_loc {
                    let text = e
                        .unescape()
                        .map_err(|e| ScanError::ParseError(e.to_string()))?;
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut loc) = current_loc {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScanError::ParseError(format!(
                    "XML parse error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ScanError::ParseError(format!(
            "unexpected end of document, <{}> is not closed",
            open
        )));
    }

    let root = root.ok_or_else(|| {
        ScanError::ParseError("document has no root element".to_string())
    })?;

    let document = match root.as_str() {
        "sitemapindex" => SitemapDocument::Index(locs_under(locs, "sitemap")),
        "urlset" => SitemapDocument::UrlSet(locs_under(locs, "url")),
        _ => SitemapDocument::Unknown {
            root,
            locs: locs.into_iter().map(|(_, loc)| loc).collect(),
        },
    };

    Ok(document)
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn locs_under(locs: Vec<(String, String)>, parent: &str) -> Vec<String> {
    locs.into_iter()
        .filter(|(p, _)| p == parent)
        .map(|(_, loc)| loc)
        .collect()
}

/// Resolve a `<loc>` value against the sitemap it was found in.
fn resolve_loc(base: &str, loc: &str) -> Option<String> {
    let resolved = match Url::parse(base) {
        Ok(base_url) => base_url.join(loc).ok()?,
        Err(_) => Url::parse(loc).ok()?,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Whether a `<loc>` from an unrecognised document looks like another sitemap.
fn looks_like_sitemap(loc: &str) -> bool {
    let path = loc.split(['?', '#']).next().unwrap_or(loc);
    path.to_ascii_lowercase().ends_with(".xml")
}

pub struct SitemapResolver<'a, F: Fetch> {
    fetcher: &'a F,
    progress_callback: Option<ResolveProgressCallback>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, F: Fetch> SitemapResolver<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            progress_callback: None,
            cancel: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ResolveProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Stop between sitemap fetches once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Flatten the sitemap tree rooted at `root_url` into page URLs.
    ///
    /// Sitemaps are processed breadth-first in document order. Every sitemap
    /// URL is fetched at most once, so self-references and cycles terminate.
    pub async fn resolve(&self, root_url: &str) -> Resolution {
        info!("Resolving sitemap tree from {}", root_url);

        let root = Url::parse(root_url.trim())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| root_url.trim().to_string());

        let mut resolution = Resolution::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut seen_pages: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        visited.insert(root.clone());
        queue.push_back(root);

        while let Some(sitemap_url) = queue.pop_front() {
            if self.is_cancelled() {
                warn!(
                    "Sitemap resolution cancelled with {} sitemap(s) still queued",
                    queue.len() + 1
                );
                resolution.cancelled = true;
                break;
            }

            resolution.sitemaps_visited += 1;
            if let Some(ref callback) = self.progress_callback {
                callback(&sitemap_url, resolution.urls.len());
            }

            let document = match self.load(&sitemap_url).await {
                Ok(document) => document,
                Err(e) => {
                    warn!("Skipping sitemap {}: {}", sitemap_url, e);
                    resolution.errors.push(ResolutionError {
                        sitemap_url,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match document {
                SitemapDocument::Index(children) => {
                    debug!("{} is a sitemap index with {} children", sitemap_url, children.len());
                    for child in children {
                        Self::enqueue(&sitemap_url, &child, &mut visited, &mut queue);
                    }
                }
                SitemapDocument::UrlSet(pages) => {
                    debug!("{} is a urlset with {} entries", sitemap_url, pages.len());
                    for page in pages {
                        Self::add_page(&sitemap_url, &page, &mut seen_pages, &mut resolution);
                    }
                }
                SitemapDocument::Unknown { root, locs } => {
                    warn!(
                        "{} has unrecognised root <{}>, scanning {} <loc> entries",
                        sitemap_url,
                        root,
                        locs.len()
                    );
                    for loc in locs {
                        if looks_like_sitemap(&loc) {
                            Self::enqueue(&sitemap_url, &loc, &mut visited, &mut queue);
                        } else {
                            Self::add_page(&sitemap_url, &loc, &mut seen_pages, &mut resolution);
                        }
                    }
                }
            }
        }

        info!(
            "Resolved {} page URL(s) from {} sitemap(s), {} error(s)",
            resolution.urls.len(),
            resolution.sitemaps_visited,
            resolution.errors.len()
        );

        resolution
    }

    async fn load(&self, sitemap_url: &str) -> Result<SitemapDocument> {
        let response = self.fetcher.fetch(sitemap_url).await?;
        if !(200..300).contains(&response.status_code) {
            return Err(ScanError::Status(response.status_code));
        }
        parse_sitemap_document(&response.body)
    }

    fn enqueue(
        sitemap_url: &str,
        loc: &str,
        visited: &mut HashSet<String>,
        queue: &mut VecDeque<String>,
    ) {
        match resolve_loc(sitemap_url, loc) {
            Some(child) => {
                if visited.insert(child.clone()) {
                    queue.push_back(child);
                } else {
                    debug!("Already visited sitemap {}", child);
                }
            }
            None => warn!("Ignoring invalid sitemap location '{}' in {}", loc, sitemap_url),
        }
    }

    fn add_page(
        sitemap_url: &str,
        loc: &str,
        seen_pages: &mut HashSet<String>,
        resolution: &mut Resolution,
    ) {
        match resolve_loc(sitemap_url, loc) {
            Some(page) => {
                if seen_pages.insert(page.clone()) {
                    resolution.urls.push(page);
                }
            }
            None => warn!("Ignoring invalid page location '{}' in {}", loc, sitemap_url),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}
