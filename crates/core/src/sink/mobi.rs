//! MOBI output via Calibre.
//!
//! MOBI is produced by writing a temporary EPUB and handing it to the
//! `ebook-convert` binary from Calibre. A missing binary or a failed
//! conversion reports a sink error without touching the other formats.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::assemble::Book;
use crate::sink::{DocumentSink, EpubSink, RenderOptions};
use crate::{Result, WebtomeError};

const CONVERTER: &str = "ebook-convert";

pub struct MobiSink;

impl DocumentSink for MobiSink {
    fn format(&self) -> &'static str {
        "mobi"
    }

    fn write(&self, book: &Book, options: &RenderOptions, path: &Path) -> Result<()> {
        let staging = tempfile::tempdir()?;
        let epub_path = staging.path().join("book.epub");
        EpubSink.write(book, options, &epub_path)?;

        debug!(output = %path.display(), "running {CONVERTER}");
        let output = Command::new(CONVERTER)
            .arg(&epub_path)
            .arg(path)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => WebtomeError::Sink {
                    format: "mobi",
                    reason: format!("{CONVERTER} not found; install Calibre to produce MOBI output"),
                },
                _ => WebtomeError::Sink { format: "mobi", reason: e.to_string() },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WebtomeError::Sink {
                format: "mobi",
                reason: format!("{CONVERTER} exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}
