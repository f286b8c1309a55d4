//! Book assembly.
//!
//! Collects extracted documents into a [`Book`]: one chapter per
//! document, in crawl order, with a table of contents whose entries
//! mirror the chapters one to one. Book-level metadata comes from the
//! first document, on the assumption that the seed page describes the
//! work as a whole.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::document::{Block, Document};
use crate::metadata::Metadata;
use crate::{Result, WebtomeError};

/// What to do with a page whose extraction produced no blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPagePolicy {
    /// Keep the chapter with a short placeholder paragraph, preserving
    /// the crawl's page count and order.
    #[default]
    KeepWithPlaceholder,
    /// Drop the chapter entirely.
    Drop,
}

/// Assembly settings.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Overrides the book title taken from the first document.
    pub title: Option<String>,
    /// Handling of documents with no content blocks.
    pub empty_pages: EmptyPagePolicy,
}

/// One chapter of an assembled book.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub title: String,
    /// Stable identifier used for file names and TOC links.
    pub anchor: String,
    pub source_url: String,
    pub blocks: Vec<Block>,
    pub metadata: Metadata,
}

/// A table-of-contents entry pointing at one chapter.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub anchor: String,
}

/// An assembled book, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub title: String,
    pub metadata: Metadata,
    pub chapters: Vec<Chapter>,
    pub toc: Vec<TocEntry>,
    /// Union of all chapter image URLs, first-seen order.
    pub images: Vec<String>,
}

/// Assembles documents into a book.
///
/// Chapter order follows document order. Every kept chapter gets exactly
/// one TOC entry.
///
/// # Errors
///
/// Returns [`WebtomeError::EmptyBook`] when no documents are given, or
/// when the empty-page policy drops every one of them.
pub fn assemble(documents: Vec<Document>, options: &AssembleOptions) -> Result<Book> {
    if documents.is_empty() {
        return Err(WebtomeError::EmptyBook);
    }

    let book_title = options
        .title
        .clone()
        .or_else(|| documents[0].metadata.title.clone())
        .unwrap_or_else(|| documents[0].title.clone());
    let book_metadata = documents[0].metadata.clone();

    let mut chapters = Vec::with_capacity(documents.len());
    let mut images = Vec::new();
    let mut seen_images: HashSet<String> = HashSet::new();

    for doc in documents {
        let mut blocks = doc.blocks;
        if blocks.is_empty() {
            match options.empty_pages {
                EmptyPagePolicy::Drop => {
                    debug!(url = %doc.source_url, "dropping empty page");
                    continue;
                }
                EmptyPagePolicy::KeepWithPlaceholder => {
                    blocks.push(Block::Paragraph(format!(
                        "No readable content was found at {}.",
                        doc.source_url
                    )));
                }
            }
        }

        for image in doc.images {
            if seen_images.insert(image.clone()) {
                images.push(image);
            }
        }

        chapters.push(Chapter {
            anchor: format!("chapter-{}", chapters.len() + 1),
            title: doc.title,
            source_url: doc.source_url,
            blocks,
            metadata: doc.metadata,
        });
    }

    if chapters.is_empty() {
        return Err(WebtomeError::EmptyBook);
    }

    let toc = chapters
        .iter()
        .map(|c| TocEntry { title: c.title.clone(), anchor: c.anchor.clone() })
        .collect();

    debug!(title = %book_title, chapters = chapters.len(), "book assembled");
    Ok(Book { title: book_title, metadata: book_metadata, chapters, toc, images })
}
