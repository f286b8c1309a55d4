pub mod assemble;
pub mod cover;
pub mod crawl;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod metadata;
pub mod parse;
pub mod pattern;
pub mod pipeline;
pub mod render;
pub mod sanitize;
pub mod sink;

pub use assemble::{AssembleOptions, Book, Chapter, EmptyPagePolicy, TocEntry, assemble};
pub use cover::{CoverArt, generate_svg_cover, load_cover};
pub use crawl::{CrawlConfig, crawl, extract_body, fetch_single};
pub use document::{Block, Document};
pub use error::{Result, WebtomeError};
pub use extract::{DEFAULT_REMOVAL_TAGS, ExtractConfig, extract, extract_with_fallback};
pub use fetch::{FetchConfig, HttpFetcher, PageFetcher, fetch_file};
pub use metadata::Metadata;
pub use parse::{Element, Page};
pub use pattern::{CrawlRules, Pattern};
pub use pipeline::{
    ConversionReport, ConvertOptions, CoverChoice, SinkOutcome, convert, convert_documents,
    convert_with_fetcher,
};
pub use sanitize::sanitize_html;
pub use sink::{
    DocumentSink, EpubSink, HtmlSink, ImageAsset, MobiSink, OutputFormat, RenderOptions, sanitize_filename,
};
