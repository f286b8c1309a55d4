//! End-to-end conversion driver.
//!
//! Ties the stages together: fetch or crawl, extract, assemble, then
//! write every requested output format. Sink failures are collected in
//! the [`ConversionReport`] rather than aborting, so one broken format
//! never costs the user the others.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};
use url::Url;

use crate::assemble::{AssembleOptions, Book, assemble};
use crate::cover::{generate_svg_cover, load_cover};
use crate::crawl::{CrawlConfig, crawl, fetch_single};
use crate::document::Document;
use crate::extract::ExtractConfig;
use crate::fetch::{FetchConfig, HttpFetcher, PageFetcher};
use crate::pattern::CrawlRules;
use crate::sink::{ImageAsset, OutputFormat, RenderOptions, sanitize_filename, sniff_image};
use crate::Result;

/// Where the cover comes from.
#[derive(Debug, Clone, Default)]
pub enum CoverChoice {
    /// Draw an SVG cover from the book metadata.
    #[default]
    Generate,
    /// Use an image file from disk.
    File(PathBuf),
    /// Ship no cover at all.
    None,
}

/// Settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Follow same-site links from the seed instead of converting one page.
    pub crawl: bool,
    /// Page cap when crawling.
    pub max_pages: usize,
    pub rules: CrawlRules,
    pub extract: ExtractConfig,
    pub assemble: AssembleOptions,
    pub formats: Vec<OutputFormat>,
    pub output_dir: PathBuf,
    pub cover: CoverChoice,
    pub fetch: FetchConfig,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            crawl: false,
            max_pages: 50,
            rules: CrawlRules::default(),
            extract: ExtractConfig::default(),
            assemble: AssembleOptions::default(),
            formats: vec![OutputFormat::Epub],
            output_dir: PathBuf::from("."),
            cover: CoverChoice::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// The result of writing one output format.
#[derive(Debug, Clone)]
pub struct SinkOutcome {
    pub format: OutputFormat,
    /// The written file, when the sink succeeded.
    pub path: Option<PathBuf>,
    pub error: Option<String>,
}

impl SinkOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub title: String,
    /// Number of pages that became chapters.
    pub pages: usize,
    pub outputs: Vec<SinkOutcome>,
}

impl ConversionReport {
    /// True when every requested format was written.
    pub fn all_succeeded(&self) -> bool {
        self.outputs.iter().all(SinkOutcome::succeeded)
    }
}

/// Converts a URL into the requested output formats.
///
/// # Errors
///
/// Fatal errors are those before the sink stage: the seed fetch, the
/// content selector parse, and assembly of an empty book.
pub async fn convert(seed: &Url, options: &ConvertOptions) -> Result<ConversionReport> {
    let fetcher = HttpFetcher::new(&options.fetch)?;
    convert_with_fetcher(seed, &fetcher, options).await
}

/// [`convert`] with a caller-supplied fetcher.
pub async fn convert_with_fetcher<F: PageFetcher>(
    seed: &Url, fetcher: &F, options: &ConvertOptions,
) -> Result<ConversionReport> {
    let documents = if options.crawl {
        let config = CrawlConfig {
            max_pages: options.max_pages,
            rules: options.rules.clone(),
            extract: options.extract.clone(),
        };
        crawl(seed, fetcher, &config).await?
    } else {
        vec![fetch_single(seed, fetcher, &options.extract).await?]
    };

    convert_documents(documents, fetcher, options).await
}

/// Assembles already-extracted documents and writes every output format.
///
/// Exposed for callers that source pages outside the fetch stage, such
/// as local HTML files.
pub async fn convert_documents<F: PageFetcher>(
    documents: Vec<Document>, fetcher: &F, options: &ConvertOptions,
) -> Result<ConversionReport> {
    let mut book = assemble(documents, &options.assemble)?;
    if options.assemble.title.is_none() {
        book.title = clean_title(&book.title);
    }

    let cover = match &options.cover {
        CoverChoice::Generate => Some(generate_svg_cover(&book.metadata)),
        CoverChoice::File(path) => Some(load_cover(path)?),
        CoverChoice::None => None,
    };

    let images = if needs_embedded_images(&options.formats) {
        download_images(fetcher, &book).await
    } else {
        Vec::new()
    };

    let render = RenderOptions { language: book.metadata.language.clone(), cover, images };

    fs::create_dir_all(&options.output_dir)?;
    let stem = sanitize_filename(&book.title);

    let mut outputs = Vec::with_capacity(options.formats.len());
    for format in &options.formats {
        let path = options.output_dir.join(format!("{stem}.{}", format.extension()));
        match format.sink().write(&book, &render, &path) {
            Ok(()) => {
                info!(format = %format, path = %path.display(), "wrote output");
                outputs.push(SinkOutcome { format: *format, path: Some(path), error: None });
            }
            Err(e) => {
                warn!(format = %format, error = %e, "output format failed");
                outputs.push(SinkOutcome { format: *format, path: None, error: Some(e.to_string()) });
            }
        }
    }

    Ok(ConversionReport { title: book.title, pages: book.chapters.len(), outputs })
}

fn needs_embedded_images(formats: &[OutputFormat]) -> bool {
    formats.iter().any(|f| matches!(f, OutputFormat::Epub | OutputFormat::Mobi))
}

/// Downloads the book's images for embedding.
///
/// Failures are logged and skipped; the affected blocks keep their
/// remote URLs.
async fn download_images<F: PageFetcher>(fetcher: &F, book: &Book) -> Vec<ImageAsset> {
    let mut assets = Vec::new();

    for url_str in &book.images {
        let Ok(url) = Url::parse(url_str) else { continue };
        match fetcher.fetch_bytes(&url).await {
            Ok(bytes) => {
                let (media_type, extension) = sniff_image(&bytes);
                assets.push(ImageAsset {
                    url: url_str.clone(),
                    file_name: format!("image_{}.{extension}", assets.len() + 1),
                    media_type,
                    bytes,
                });
            }
            Err(e) => {
                warn!(url = %url_str, error = %e, "skipping image that failed to download");
            }
        }
    }

    assets
}

/// Strips a trailing site-name segment from a page title.
fn clean_title(title: &str) -> String {
    for separator in [" | ", " — ", " – ", " :: "] {
        if let Some((left, _)) = title.rsplit_once(separator) {
            let left = left.trim();
            if left.len() >= 3 {
                return left.to_string();
            }
        }
    }
    title.trim().to_string()
}
