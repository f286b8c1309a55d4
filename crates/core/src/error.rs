//! Error types for webtome operations.
//!
//! This module defines the main error type [`WebtomeError`] which represents
//! all possible errors that can occur while fetching pages, extracting
//! content, crawling, assembling a book, and writing output formats.
//!
//! # Example
//!
//! ```rust
//! use webtome_core::{WebtomeError, Result};
//!
//! fn check_input(html: &str) -> Result<()> {
//!     if html.is_empty() {
//!         return Err(WebtomeError::EmptyBook);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the conversion pipeline.
///
/// Errors on the seed page and during assembly are fatal; fetch and
/// extraction errors on crawled links downgrade to skip-and-continue
/// inside the frontier, and sink errors stay scoped to one output format.
#[derive(Error, Debug)]
pub enum WebtomeError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and
    /// non-success HTTP status codes.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, most often an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// An explicit content selector matched nothing in the page.
    ///
    /// The default driver falls back to automatic content detection
    /// instead of aborting, surfacing a warning to the caller.
    #[error("Content selector matched no elements: {0}")]
    SelectorNotFound(String),

    /// No documents were available to assemble into a book.
    #[error("No documents to assemble into a book")]
    EmptyBook,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A single output-format encoder failed.
    ///
    /// Non-fatal to other formats: the pipeline records which formats
    /// succeeded and which failed instead of aborting the run.
    #[error("{format} output failed: {reason}")]
    Sink { format: &'static str, reason: String },
}

/// Result type alias for WebtomeError.
pub type Result<T> = std::result::Result<T, WebtomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WebtomeError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_selector_not_found_display() {
        let err = WebtomeError::SelectorNotFound("#missing".to_string());
        assert!(err.to_string().contains("#missing"));
    }

    #[test]
    fn test_sink_error_display() {
        let err = WebtomeError::Sink { format: "mobi", reason: "ebook-convert not found".to_string() };
        assert!(err.to_string().contains("mobi"));
        assert!(err.to_string().contains("ebook-convert"));
    }

    #[test]
    fn test_timeout_error() {
        let err = WebtomeError::Timeout { timeout: 30 };
        assert!(err.to_string().contains("30"));
    }
}
