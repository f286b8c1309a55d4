//! Standalone HTML output.
//!
//! Writes the whole book as a single self-contained HTML file with an
//! inline stylesheet and an in-page table of contents. Images keep
//! their remote URLs so the file stays a single artifact.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::assemble::Book;
use crate::render::{chapter_body, escape_html, stylesheet, toc_fragment};
use crate::sink::{DocumentSink, RenderOptions};
use crate::Result;

pub struct HtmlSink;

impl DocumentSink for HtmlSink {
    fn format(&self) -> &'static str {
        "html"
    }

    fn write(&self, book: &Book, options: &RenderOptions, path: &Path) -> Result<()> {
        let mut body = String::new();

        body.push_str(&format!("<header>\n<h1>{}</h1>\n", escape_html(&book.title)));
        if let Some(author) = &book.metadata.author {
            body.push_str(&format!("<p class=\"author\">{}</p>\n", escape_html(author)));
        }
        body.push_str("</header>\n");

        body.push_str(&toc_fragment(book, |anchor| format!("#{anchor}")));

        let image_map = HashMap::new();
        for chapter in &book.chapters {
            body.push_str(&format!("<section id=\"{}\">\n", escape_html(&chapter.anchor)));
            body.push_str(&chapter_body(chapter, &image_map));
            body.push_str("</section>\n");
        }

        let document = format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8"/>
<title>{title}</title>
<style>
{css}</style>
</head>
<body>
{body}</body>
</html>
"#,
            lang = escape_html(options.language()),
            title = escape_html(&book.title),
            css = stylesheet(),
        );

        fs::write(path, document)?;
        Ok(())
    }
}
