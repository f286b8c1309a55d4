//! XHTML rendering shared by the HTML and EPUB outputs.
//!
//! Each renderer dispatches on the block tag; raw HTML blocks pass
//! through unescaped, everything else is escaped on the way out.

use std::collections::HashMap;

use crate::assemble::{Book, Chapter};
use crate::document::Block;

/// Escapes text for placement inside XHTML content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders a chapter's blocks as an XHTML body fragment.
///
/// `image_map` rewrites remote image URLs to local file names for
/// outputs that embed downloaded images; URLs not in the map keep their
/// remote form.
pub fn chapter_body(chapter: &Chapter, image_map: &HashMap<String, String>) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", escape_html(&chapter.title)));

    for block in &chapter.blocks {
        render_block(&mut body, block, image_map);
    }
    body
}

fn render_block(out: &mut String, block: &Block, image_map: &HashMap<String, String>) {
    match block {
        Block::Heading { level, text } => {
            // Chapter titles own <h1>; content headings shift down one level.
            let level = (*level + 1).min(6);
            out.push_str(&format!("<h{level}>{}</h{level}>\n", escape_html(text)));
        }
        Block::Paragraph(text) => {
            out.push_str(&format!("<p>{}</p>\n", escape_html(text)));
        }
        Block::Image { src, alt, caption } => {
            let src = image_map.get(src).map_or(src.as_str(), String::as_str);
            match caption {
                Some(caption) => out.push_str(&format!(
                    "<figure><img src=\"{}\" alt=\"{}\"/><figcaption>{}</figcaption></figure>\n",
                    escape_html(src),
                    escape_html(alt),
                    escape_html(caption)
                )),
                None => out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\"/>\n",
                    escape_html(src),
                    escape_html(alt)
                )),
            }
        }
        Block::Code { text, language } => {
            let class = language
                .as_ref()
                .map(|lang| format!(" class=\"language-{}\"", escape_html(lang)))
                .unwrap_or_default();
            out.push_str(&format!("<pre><code{class}>{}</code></pre>\n", escape_html(text)));
        }
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>\n"));
            for item in items {
                out.push_str(&format!("<li>{}</li>\n", escape_html(item)));
            }
            out.push_str(&format!("</{tag}>\n"));
        }
        Block::Quote(text) => {
            out.push_str(&format!("<blockquote><p>{}</p></blockquote>\n", escape_html(text)));
        }
        Block::Html(html) => {
            out.push_str(html);
            out.push('\n');
        }
    }
}

/// Renders one chapter as a complete XHTML document for EPUB packaging.
pub fn chapter_xhtml(chapter: &Chapter, language: &str, image_map: &HashMap<String, String>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}" lang="{lang}">
<head>
<title>{title}</title>
<link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
{body}</body>
</html>
"#,
        lang = escape_html(language),
        title = escape_html(&chapter.title),
        body = chapter_body(chapter, image_map),
    )
}

/// The stylesheet shared by every output format.
pub fn stylesheet() -> &'static str {
    r#"body {
    font-family: Georgia, "Times New Roman", serif;
    line-height: 1.6;
    margin: 1em auto;
    max-width: 40em;
    padding: 0 1em;
}

h1, h2, h3, h4, h5, h6 {
    font-family: Helvetica, Arial, sans-serif;
    line-height: 1.25;
    margin-top: 1.4em;
}

img {
    max-width: 100%;
    height: auto;
}

figure {
    margin: 1em 0;
    text-align: center;
}

figcaption {
    font-size: 0.85em;
    color: #555;
}

pre {
    background: #f5f5f5;
    border-radius: 4px;
    overflow-x: auto;
    padding: 0.75em;
}

code {
    font-family: "SF Mono", Consolas, Menlo, monospace;
    font-size: 0.9em;
}

blockquote {
    border-left: 3px solid #ccc;
    color: #555;
    margin-left: 0;
    padding-left: 1em;
}

table {
    border-collapse: collapse;
    width: 100%;
}

td, th {
    border: 1px solid #ccc;
    padding: 0.4em;
}

.toc ol {
    list-style: none;
    padding-left: 0;
}
"#
}

/// Renders the book's table of contents as an XHTML fragment.
pub fn toc_fragment(book: &Book, href: impl Fn(&str) -> String) -> String {
    let mut out = String::from("<nav class=\"toc\">\n<h2>Contents</h2>\n<ol>\n");
    for entry in &book.toc {
        out.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&href(&entry.anchor)),
            escape_html(&entry.title)
        ));
    }
    out.push_str("</ol>\n</nav>\n");
    out
}
