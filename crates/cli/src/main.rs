mod echo;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;
use webtome_core::{
    AssembleOptions, ConversionReport, ConvertOptions, CoverChoice, CrawlRules, EmptyPagePolicy,
    ExtractConfig, FetchConfig, HttpFetcher, OutputFormat, convert_documents, convert_with_fetcher,
    extract_body, fetch_file,
};

use echo::{print_banner, print_error, print_info, print_step, print_success};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert web pages into ebooks
#[derive(Parser, Debug)]
#[command(name = "webtome")]
#[command(author = "Webtome Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Convert web pages into EPUB, HTML, or MOBI ebooks", long_about = None)]
struct Args {
    /// URL to convert, or a local HTML file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output formats (epub, html, mobi)
    #[arg(short, long, value_name = "FORMAT", default_value = "epub", value_delimiter = ',')]
    format: Vec<OutputFormat>,

    /// Output directory
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// Override the book title
    #[arg(short, long, value_name = "TITLE")]
    title: Option<String>,

    /// Follow same-site links from the seed page
    #[arg(long)]
    crawl: bool,

    /// Maximum pages to crawl
    #[arg(long, default_value = "50", value_name = "NUM", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: u32,

    /// CSS selector for the content root
    #[arg(long, value_name = "SELECTOR")]
    content_selector: Option<String>,

    /// CSS selectors to drop from extracted content (repeatable)
    #[arg(long, value_name = "SELECTOR")]
    exclude_selector: Vec<String>,

    /// URL pattern a crawled link must match (repeatable)
    #[arg(long, value_name = "PATTERN")]
    include: Vec<String>,

    /// File with include patterns, one per line
    #[arg(long, value_name = "FILE")]
    include_file: Option<PathBuf>,

    /// URL pattern that blocks a crawled link (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// File with exclude patterns, one per line
    #[arg(long, value_name = "FILE")]
    exclude_file: Option<PathBuf>,

    /// Use an image file as the cover instead of generating one
    #[arg(long, value_name = "FILE", conflicts_with = "no_cover")]
    cover: Option<PathBuf>,

    /// Produce no cover at all
    #[arg(long)]
    no_cover: bool,

    /// Drop crawled pages with no readable content
    #[arg(long)]
    drop_empty_pages: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn convert_options(&self) -> anyhow::Result<ConvertOptions> {
        let rules = CrawlRules::load(
            &self.include,
            self.include_file.as_deref(),
            &self.exclude,
            self.exclude_file.as_deref(),
        )
        .context("Failed to load URL patterns")?;

        let cover = if self.no_cover {
            CoverChoice::None
        } else if let Some(path) = &self.cover {
            CoverChoice::File(path.clone())
        } else {
            CoverChoice::Generate
        };

        let empty_pages =
            if self.drop_empty_pages { EmptyPagePolicy::Drop } else { EmptyPagePolicy::KeepWithPlaceholder };

        let mut fetch = FetchConfig { timeout: self.timeout, ..FetchConfig::default() };
        if let Some(user_agent) = &self.user_agent {
            fetch.user_agent = user_agent.clone();
        }

        Ok(ConvertOptions {
            crawl: self.crawl,
            max_pages: self.max_pages as usize,
            rules,
            extract: ExtractConfig {
                content_selector: self.content_selector.clone(),
                exclude_selectors: self.exclude_selector.clone(),
                ..ExtractConfig::default()
            },
            assemble: AssembleOptions { title: self.title.clone(), empty_pages },
            formats: self.format.clone(),
            output_dir: self.output.clone(),
            cover,
            fetch,
        })
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "webtome=debug,webtome_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Builds a `file://` URL for a local input so relative references and
/// URL-derived metadata still resolve.
fn file_url(path: &Path) -> Url {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute)
        .unwrap_or_else(|_| Url::parse("file:///input.html").unwrap_or_else(|_| unreachable!()))
}

fn print_report(report: &ConversionReport) {
    print_info(&format!("{} ({} pages)", report.title, report.pages));
    for outcome in &report.outputs {
        match (&outcome.path, &outcome.error) {
            (Some(path), _) => {
                print_success(&format!("{} written to {}", outcome.format, path.display().bright_white()))
            }
            (None, Some(error)) => print_error(&format!("{} failed: {}", outcome.format, error)),
            (None, None) => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        print_banner();
    }

    let options = args.convert_options()?;

    let report = if args.input.starts_with("http://") || args.input.starts_with("https://") {
        let seed = Url::parse(&args.input).with_context(|| format!("Invalid URL: {}", args.input))?;

        if args.verbose {
            let mode = if args.crawl { "Crawling" } else { "Fetching" };
            print_step(1, 2, &format!("{mode} from {}", args.input.bright_white().underline()));
        }

        convert_with_fetcher(&seed, &HttpFetcher::new(&options.fetch)?, &options)
            .await
            .context("Conversion failed")?
    } else {
        if args.crawl {
            bail!("--crawl requires a URL input, not a local file");
        }

        if args.verbose {
            print_step(1, 2, &format!("Reading from file {}", args.input.bright_white()));
        }

        let path = PathBuf::from(&args.input);
        let html = fetch_file(&path).with_context(|| format!("Failed to read file: {}", args.input))?;
        let document = extract_body(&html, &file_url(&path), &options.extract)
            .context("Failed to extract content")?;

        convert_documents(vec![document], &HttpFetcher::new(&options.fetch)?, &options)
            .await
            .context("Conversion failed")?
    };

    if args.verbose {
        print_step(2, 2, "Writing output");
    }
    print_report(&report);

    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}
