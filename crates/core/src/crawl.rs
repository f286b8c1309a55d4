//! Breadth-first crawl frontier.
//!
//! Starting from a seed URL, the frontier fetches pages, extracts each
//! one into a [`Document`], and discovers outgoing links in page order.
//! Visited and queued URLs are tracked separately so a URL is fetched at
//! most once and enqueued at most once, and the crawl stops when the
//! queue empties or the page cap is reached. Only links on the seed's
//! exact host are followed.

use std::collections::{HashSet, VecDeque};

use scraper::Selector;
use tracing::{info, warn};
use url::Url;

use crate::document::Document;
use crate::extract::{ExtractConfig, extract_with_fallback};
use crate::fetch::PageFetcher;
use crate::parse::Page;
use crate::pattern::CrawlRules;
use crate::sanitize::sanitize_html;
use crate::Result;

/// File extensions that never point at an HTML page.
const NON_HTML_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "pdf", "zip", "mp4", "mp3", "css", "js", "xml", "json", "svg", "ico",
    "webp", "bmp", "doc", "docx",
];

/// Settings for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Upper bound on pages fetched, seed included.
    pub max_pages: usize,
    /// Include/exclude URL rules applied to discovered links.
    pub rules: CrawlRules,
    /// Extraction settings applied to every crawled page.
    pub extract: ExtractConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_pages: 50, rules: CrawlRules::default(), extract: ExtractConfig::default() }
    }
}

/// Crawls from a seed URL, returning extracted documents in visit order.
///
/// A failed fetch of the seed is fatal; failures on discovered links are
/// logged and skipped so one dead link never sinks a crawl. With
/// `max_pages` of zero the crawl returns no documents.
///
/// # Errors
///
/// Returns the seed's fetch error, or an extraction error on any page.
pub async fn crawl<F: PageFetcher>(seed: &Url, fetcher: &F, config: &CrawlConfig) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queued: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<Url> = VecDeque::new();

    let seed = strip_fragment(seed);
    queued.insert(seed.to_string());
    queue.push_back(seed.clone());

    while let Some(url) = queue.pop_front() {
        if documents.len() >= config.max_pages {
            break;
        }
        if !visited.insert(url.to_string()) {
            continue;
        }

        info!(%url, visited = visited.len(), queued = queue.len(), "crawling page");
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) if documents.is_empty() && url == seed => return Err(e),
            Err(e) => {
                warn!(%url, error = %e, "skipping page that failed to fetch");
                continue;
            }
        };

        let clean = sanitize_html(&body, Some(&url));
        let page = Page::parse_with_url(&clean, url.clone());
        documents.push(extract_with_fallback(&page, &url, &config.extract)?);

        for link in discover_links(&page, &seed, &config.rules) {
            let key = link.to_string();
            if !visited.contains(&key) && queued.insert(key) {
                queue.push_back(link);
            }
        }
    }

    info!(pages = documents.len(), "crawl finished");
    Ok(documents)
}

/// Converts and extracts a single page without following links.
pub async fn fetch_single<F: PageFetcher>(url: &Url, fetcher: &F, config: &ExtractConfig) -> Result<Document> {
    let body = fetcher.fetch(url).await?;
    extract_body(&body, url, config)
}

/// Extracts a document from an already-fetched body.
pub fn extract_body(body: &str, url: &Url, config: &ExtractConfig) -> Result<Document> {
    let clean = sanitize_html(body, Some(url));
    let page = Page::parse_with_url(&clean, url.clone());
    extract_with_fallback(&page, url, config)
}

/// Collects crawlable links from a page, in document order.
fn discover_links(page: &Page, seed: &Url, rules: &CrawlRules) -> Vec<Url> {
    let Ok(sel) = Selector::parse("a[href]") else { return Vec::new() };

    let mut links = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for anchor in page.html().select(&sel) {
        let Some(href) = anchor.value().attr("href") else { continue };
        let base = page.url().unwrap_or(seed);
        let Ok(resolved) = base.join(href) else { continue };
        let resolved = strip_fragment(&resolved);

        if !is_crawlable(&resolved, seed) || !rules.is_allowed(resolved.as_str()) {
            continue;
        }
        if seen.insert(resolved.to_string()) {
            links.push(resolved);
        }
    }

    links
}

/// A link is crawlable when it is http(s), stays on the seed's exact
/// host and port, and looks like an HTML page.
fn is_crawlable(url: &Url, seed: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str() == seed.host_str()
        && url.port_or_known_default() == seed.port_or_known_default()
        && is_html_like(url)
}

/// Extension heuristic: trailing slashes, extensionless paths, and
/// `.html`/`.htm` pass; known binary and asset extensions are skipped.
fn is_html_like(url: &Url) -> bool {
    let path = url.path();
    if path.ends_with('/') || path.is_empty() {
        return true;
    }

    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ext == "html" || ext == "htm" || !NON_HTML_EXTENSIONS.contains(&ext.as_str())
        }
        None => true,
    }
}

fn strip_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}
