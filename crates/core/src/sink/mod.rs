//! Output sinks.
//!
//! Each format implements [`DocumentSink`], taking an assembled
//! [`Book`] plus render options and writing one file. A sink failure is
//! reported through [`WebtomeError::Sink`] and never prevents the other
//! requested formats from being written.

mod epub;
mod html;
mod mobi;

use std::path::Path;
use std::str::FromStr;

pub use epub::EpubSink;
pub use html::HtmlSink;
pub use mobi::MobiSink;

use crate::assemble::Book;
use crate::cover::CoverArt;
use crate::{Result, WebtomeError};

/// A requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Epub,
    Html,
    Mobi,
}

impl OutputFormat {
    /// The file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Epub => "epub",
            Self::Html => "html",
            Self::Mobi => "mobi",
        }
    }

    /// The sink implementation for this format.
    pub fn sink(&self) -> Box<dyn DocumentSink> {
        match self {
            Self::Epub => Box::new(EpubSink),
            Self::Html => Box::new(HtmlSink),
            Self::Mobi => Box::new(MobiSink),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = WebtomeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epub" => Ok(Self::Epub),
            "html" => Ok(Self::Html),
            "mobi" => Ok(Self::Mobi),
            other => Err(WebtomeError::Sink {
                format: "output",
                reason: format!("unknown format '{other}', expected epub, html, or mobi"),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A downloaded image ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// The absolute URL the image was fetched from.
    pub url: String,
    /// Local file name inside the output package.
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything a sink needs beyond the book itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// BCP 47 language tag; defaults to `en` when the pages declare none.
    pub language: Option<String>,
    pub cover: Option<CoverArt>,
    /// Downloaded images, embedded by formats that support it.
    pub images: Vec<ImageAsset>,
}

impl RenderOptions {
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}

/// Writes an assembled book in one output format.
pub trait DocumentSink {
    /// Short format name used in errors and reports.
    fn format(&self) -> &'static str;

    /// Writes the book to `path`.
    fn write(&self, book: &Book, options: &RenderOptions, path: &Path) -> Result<()>;
}

/// Reduces a book title to a safe file stem.
///
/// Keeps alphanumerics, spaces become underscores, everything else is
/// dropped; the result is capped at 50 characters.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let capped: String = joined.chars().take(50).collect();

    if capped.is_empty() { "untitled".to_string() } else { capped }
}

/// Identifies an image's media type from its magic bytes.
///
/// Falls back to JPEG for unrecognized data, since that is the most
/// common unlabeled case on the web.
pub fn sniff_image(bytes: &[u8]) -> (&'static str, &'static str) {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        ("image/png", "png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        ("image/jpeg", "jpg")
    } else if bytes.starts_with(b"GIF8") {
        ("image/gif", "gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        ("image/webp", "webp")
    } else if bytes.starts_with(b"<?xml") || bytes.starts_with(b"<svg") {
        ("image/svg+xml", "svg")
    } else {
        ("image/jpeg", "jpg")
    }
}
