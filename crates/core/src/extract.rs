//! Content extraction.
//!
//! Turns a parsed page into a [`Document`] of tagged blocks. The walk
//! starts at a content root, found either through an explicit CSS
//! selector or a fixed heuristic chain, and descends in source order,
//! skipping suppressed subtrees (boilerplate tags and user-supplied
//! exclude selectors) rather than mutating the tree.

use std::collections::HashSet;

use scraper::{ElementRef, Node, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::document::{Block, Document};
use crate::metadata::{collapse_whitespace, url_slug};
use crate::parse::{Page, parse_selector};
use crate::{Result, WebtomeError};

/// Tags always dropped from extracted content, with their entire subtrees.
pub const DEFAULT_REMOVAL_TAGS: &[&str] =
    &["script", "style", "nav", "header", "footer", "aside", "iframe", "noscript"];

/// Inline tags flattened into the surrounding text run. Anything not
/// listed here or handled explicitly is treated as a container and
/// descended into, so content inside tags like `details` or `dl`
/// keeps its block identity.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "em", "i", "mark", "q", "s", "small", "span", "strong", "sub",
    "sup", "time", "u",
];

/// Content-root candidates tried in order when no selector is given.
const ROOT_CANDIDATES: &[&str] = &["main", "article", "#content", "#main-content"];

/// Settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// CSS selector naming the content root. When it matches nothing the
    /// extractor reports [`WebtomeError::SelectorNotFound`].
    pub content_selector: Option<String>,
    /// CSS selectors whose matches are dropped, subtree included.
    pub exclude_selectors: Vec<String>,
    /// Tags dropped unconditionally. Defaults to [`DEFAULT_REMOVAL_TAGS`].
    pub removal_tags: &'static [&'static str],
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { content_selector: None, exclude_selectors: Vec::new(), removal_tags: DEFAULT_REMOVAL_TAGS }
    }
}

/// Extracts the content of a page into a [`Document`].
///
/// `page_url` resolves relative image references and feeds URL-derived
/// metadata fallbacks.
///
/// # Errors
///
/// Returns [`WebtomeError::SelectorNotFound`] when an explicit content
/// selector matches nothing, and [`WebtomeError::HtmlParseError`] when
/// the content selector itself does not parse. Invalid exclude selectors
/// are logged and skipped instead.
pub fn extract(page: &Page, page_url: &Url, config: &ExtractConfig) -> Result<Document> {
    let root = find_content_root(page, config)?;

    let excludes = compile_excludes(&config.exclude_selectors);
    let mut walker = Walker::new(page_url, config.removal_tags, &excludes);
    walker.walk(root);
    walker.flush_text();

    let title = document_title(root, page, page_url);
    debug!(url = %page_url, blocks = walker.blocks.len(), images = walker.images.len(), "extracted page");

    Ok(Document {
        source_url: page_url.to_string(),
        title,
        blocks: walker.blocks,
        images: walker.images,
        metadata: page.extract_metadata(page_url),
    })
}

/// Extracts with automatic retry when the content selector misses.
///
/// A missed selector downgrades to a warning and a second pass using the
/// heuristic root detection, so one page with different markup does not
/// abort a whole crawl.
pub fn extract_with_fallback(page: &Page, page_url: &Url, config: &ExtractConfig) -> Result<Document> {
    match extract(page, page_url, config) {
        Err(WebtomeError::SelectorNotFound(selector)) => {
            warn!(url = %page_url, %selector, "content selector matched nothing, falling back to auto-detection");
            let fallback = ExtractConfig { content_selector: None, ..config.clone() };
            extract(page, page_url, &fallback)
        }
        other => other,
    }
}

/// Locates the element to extract from.
///
/// An explicit selector is authoritative. Otherwise the candidates in
/// [`ROOT_CANDIDATES`] are tried in order, then the `<div>` with the most
/// text, then `<body>`, then the document root.
fn find_content_root<'a>(page: &'a Page, config: &ExtractConfig) -> Result<ElementRef<'a>> {
    if let Some(selector) = &config.content_selector {
        let sel = parse_selector(selector)?;
        return page
            .html()
            .select(&sel)
            .next()
            .ok_or_else(|| WebtomeError::SelectorNotFound(selector.clone()));
    }

    for candidate in ROOT_CANDIDATES {
        if let Ok(sel) = Selector::parse(candidate)
            && let Some(found) = page.html().select(&sel).next()
        {
            return Ok(found);
        }
    }

    if let Ok(sel) = Selector::parse("div")
        && let Some(densest) = page
            .html()
            .select(&sel)
            .max_by_key(|div| div.text().map(str::len).sum::<usize>())
    {
        return Ok(densest);
    }

    if let Ok(sel) = Selector::parse("body")
        && let Some(body) = page.html().select(&sel).next()
    {
        return Ok(body);
    }

    Ok(page.root())
}

fn compile_excludes(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|raw| match Selector::parse(raw) {
            Ok(sel) => Some(sel),
            Err(e) => {
                warn!(selector = %raw, error = %e, "skipping invalid exclude selector");
                None
            }
        })
        .collect()
}

/// Title chain: first `<h1>` inside the content root, then the page
/// `<title>`, then the URL slug, then the full URL.
fn document_title(root: ElementRef<'_>, page: &Page, page_url: &Url) -> String {
    if let Ok(sel) = Selector::parse("h1") {
        for heading in root.select(&sel) {
            let text = collapse_whitespace(&heading.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
    }
    if let Some(title) = page.title() {
        return title;
    }
    url_slug(page_url).unwrap_or_else(|| page_url.to_string())
}

/// Recursive walk state for one extraction.
struct Walker<'a> {
    base_url: &'a Url,
    removal_tags: &'static [&'static str],
    excludes: &'a [Selector],
    blocks: Vec<Block>,
    images: Vec<String>,
    seen_images: HashSet<String>,
    pending_text: String,
}

impl<'a> Walker<'a> {
    fn new(base_url: &'a Url, removal_tags: &'static [&'static str], excludes: &'a [Selector]) -> Self {
        Self {
            base_url,
            removal_tags,
            excludes,
            blocks: Vec::new(),
            images: Vec::new(),
            seen_images: HashSet::new(),
            pending_text: String::new(),
        }
    }

    fn is_suppressed(&self, element: &ElementRef<'_>) -> bool {
        let tag = element.value().name();
        self.removal_tags.contains(&tag) || self.excludes.iter().any(|sel| sel.matches(element))
    }

    fn walk(&mut self, element: ElementRef<'a>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    self.pending_text.push_str(text);
                }
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.dispatch(el);
                    }
                }
                _ => {}
            }
        }
    }

    fn dispatch(&mut self, el: ElementRef<'a>) {
        if self.is_suppressed(&el) {
            return;
        }

        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.emit_heading(el),
            "p" => self.emit_paragraph(el),
            "img" => self.emit_image(el, None),
            "figure" => self.emit_figure(el),
            "pre" => self.emit_code(el),
            "ul" => self.emit_list(el, false),
            "ol" => self.emit_list(el, true),
            "blockquote" => self.emit_quote(el),
            "table" => self.emit_raw_html(el),
            // Inline content between blocks accumulates and flushes as a
            // paragraph at the next block boundary.
            tag if INLINE_TAGS.contains(&tag) => self.pending_text.push_str(&el.text().collect::<String>()),
            _ => self.walk(el),
        }
    }

    /// Emits any accumulated stray text as a paragraph.
    fn flush_text(&mut self) {
        let text = collapse_whitespace(&self.pending_text);
        self.pending_text.clear();
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph(text));
        }
    }

    fn emit_heading(&mut self, el: ElementRef<'_>) {
        self.flush_text();
        let text = collapse_whitespace(&el.text().collect::<String>());
        if text.is_empty() {
            return;
        }
        let level = el.value().name().as_bytes()[1] - b'0';
        self.blocks.push(Block::Heading { level, text });
    }

    fn emit_paragraph(&mut self, el: ElementRef<'a>) {
        self.flush_text();

        // Images nested inside a paragraph still surface as image blocks.
        if let Ok(img_sel) = Selector::parse("img") {
            for img in el.select(&img_sel) {
                self.emit_image(img, None);
            }
        }

        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph(text));
        }
    }

    fn emit_image(&mut self, el: ElementRef<'_>, caption: Option<String>) {
        self.flush_text();
        let Some(src) = el.value().attr("src") else { return };
        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            return;
        }
        let Ok(resolved) = self.base_url.join(src) else { return };
        let src = resolved.to_string();

        if self.seen_images.insert(src.clone()) {
            self.images.push(src.clone());
        }
        let alt = el.value().attr("alt").unwrap_or("").trim().to_string();
        self.blocks.push(Block::Image { src, alt, caption });
    }

    fn emit_figure(&mut self, el: ElementRef<'a>) {
        self.flush_text();
        let caption = Selector::parse("figcaption").ok().and_then(|sel| {
            el.select(&sel).next().map(|c| collapse_whitespace(&c.text().collect::<String>()))
        });
        let caption = caption.filter(|c| !c.is_empty());

        if let Ok(img_sel) = Selector::parse("img")
            && let Some(img) = el.select(&img_sel).next()
        {
            self.emit_image(img, caption);
        }
    }

    /// Preformatted text is kept verbatim, never whitespace-collapsed.
    fn emit_code(&mut self, el: ElementRef<'_>) {
        self.flush_text();
        let text = el.text().collect::<String>();
        let text = text.trim_matches('\n').to_string();
        if text.is_empty() {
            return;
        }

        // A class on a nested <code> wins over one on the <pre> itself.
        let mut language = None;
        if let Ok(code_sel) = Selector::parse("code")
            && let Some(code) = el.select(&code_sel).next()
        {
            language = language_hint(code);
        }
        if language.is_none() {
            language = language_hint(el);
        }

        self.blocks.push(Block::Code { text, language });
    }

    fn emit_list(&mut self, el: ElementRef<'_>, ordered: bool) {
        self.flush_text();

        // Direct children only, so a nested list does not duplicate items.
        let items: Vec<String> = el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(|li| collapse_whitespace(&li.text().collect::<String>()))
            .filter(|item| !item.is_empty())
            .collect();

        if !items.is_empty() {
            self.blocks.push(Block::List { ordered, items });
        }
    }

    fn emit_quote(&mut self, el: ElementRef<'_>) {
        self.flush_text();
        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            self.blocks.push(Block::Quote(text));
        }
    }

    fn emit_raw_html(&mut self, el: ElementRef<'_>) {
        self.flush_text();
        self.blocks.push(Block::Html(el.html()));
    }
}

/// Reads a `language-*` or `lang-*` class as a code language hint.
fn language_hint(el: ElementRef<'_>) -> Option<String> {
    el.value().attr("class")?.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/guide/intro").unwrap()
    }

    fn extract_html(html: &str, config: &ExtractConfig) -> Document {
        extract(&Page::parse(html), &url(), config).unwrap()
    }

    #[test]
    fn test_blocks_in_source_order() {
        let doc = extract_html(
            r#"<html><body><main>
                <h1>Title</h1>
                <p>First paragraph.</p>
                <h2>Section</h2>
                <p>Second paragraph.</p>
            </main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading { level: 1, text: "Title".into() },
                Block::Paragraph("First paragraph.".into()),
                Block::Heading { level: 2, text: "Section".into() },
                Block::Paragraph("Second paragraph.".into()),
            ]
        );
        assert_eq!(doc.title, "Title");
    }

    #[test]
    fn test_removal_tags_dropped_with_subtrees() {
        let doc = extract_html(
            r#"<html><body><main>
                <nav><a href="/">Home</a><p>Menu text</p></nav>
                <p>Kept.</p>
                <script>var x = 1;</script>
                <footer><p>Copyright</p></footer>
            </main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(doc.blocks, vec![Block::Paragraph("Kept.".into())]);
    }

    #[test]
    fn test_exclude_selectors_suppress_matches() {
        let config = ExtractConfig {
            exclude_selectors: vec![".ads".to_string(), "#related".to_string()],
            ..ExtractConfig::default()
        };
        let doc = extract_html(
            r#"<html><body><main>
                <p>Content.</p>
                <div class="ads"><p>Buy now</p></div>
                <div id="related"><p>See also</p></div>
            </main></body></html>"#,
            &config,
        );

        assert_eq!(doc.blocks, vec![Block::Paragraph("Content.".into())]);
    }

    #[test]
    fn test_invalid_exclude_selector_is_skipped() {
        let config =
            ExtractConfig { exclude_selectors: vec!["[[broken".to_string()], ..ExtractConfig::default() };
        let doc = extract_html("<html><body><main><p>Still works.</p></main></body></html>", &config);
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_content_selector_miss_is_an_error() {
        let config = ExtractConfig {
            content_selector: Some("#no-such-root".to_string()),
            ..ExtractConfig::default()
        };
        let result = extract(&Page::parse("<html><body><p>x</p></body></html>"), &url(), &config);
        assert!(matches!(result, Err(WebtomeError::SelectorNotFound(_))));
    }

    #[test]
    fn test_fallback_retries_without_selector() {
        let config = ExtractConfig {
            content_selector: Some("#no-such-root".to_string()),
            ..ExtractConfig::default()
        };
        let page = Page::parse("<html><body><main><p>Recovered.</p></main></body></html>");
        let doc = extract_with_fallback(&page, &url(), &config).unwrap();
        assert_eq!(doc.blocks, vec![Block::Paragraph("Recovered.".into())]);
    }

    #[test]
    fn test_images_resolved_and_deduplicated() {
        let doc = extract_html(
            r#"<html><body><main>
                <img src="/a.png" alt="first">
                <img src="https://example.com/a.png" alt="same again">
                <img src="b.jpg">
            </main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.images,
            vec!["https://example.com/a.png".to_string(), "https://example.com/guide/b.jpg".to_string()]
        );
        assert_eq!(doc.blocks.len(), 3);
    }

    #[test]
    fn test_figure_caption() {
        let doc = extract_html(
            r#"<html><body><main><figure>
                <img src="/chart.png" alt="chart">
                <figcaption>Quarterly numbers</figcaption>
            </figure></main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![Block::Image {
                src: "https://example.com/chart.png".into(),
                alt: "chart".into(),
                caption: Some("Quarterly numbers".into()),
            }]
        );
    }

    #[test]
    fn test_code_block_keeps_whitespace_and_language() {
        let doc = extract_html(
            "<html><body><main><pre><code class=\"language-rust\">fn main() {\n    run();\n}</code></pre></main></body></html>",
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![Block::Code {
                text: "fn main() {\n    run();\n}".into(),
                language: Some("rust".into()),
            }]
        );
    }

    #[test]
    fn test_lists_and_quotes() {
        let doc = extract_html(
            r#"<html><body><main>
                <ul><li>one</li><li>two</li></ul>
                <ol><li>first</li></ol>
                <blockquote>Quoted words.</blockquote>
            </main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![
                Block::List { ordered: false, items: vec!["one".into(), "two".into()] },
                Block::List { ordered: true, items: vec!["first".into()] },
                Block::Quote("Quoted words.".into()),
            ]
        );
    }

    #[test]
    fn test_table_preserved_as_html() {
        let doc = extract_html(
            "<html><body><main><table><tr><td>cell</td></tr></table></main></body></html>",
            &ExtractConfig::default(),
        );

        assert_eq!(doc.blocks.len(), 1);
        match &doc.blocks[0] {
            Block::Html(html) => assert!(html.contains("<td>cell</td>")),
            other => panic!("expected raw html block, got {other:?}"),
        }
    }

    #[test]
    fn test_root_detection_prefers_article_over_body() {
        let doc = extract_html(
            r#"<html><body>
                <p>Chrome text</p>
                <article><p>Article text</p></article>
            </body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(doc.blocks, vec![Block::Paragraph("Article text".into())]);
    }

    #[test]
    fn test_lower_headings_do_not_set_the_title() {
        let doc = extract(
            &Page::parse(
                "<html><head><title>From Title Tag</title></head><body><main><h2>Section Only</h2><p>x</p></main></body></html>",
            ),
            &url(),
            &ExtractConfig::default(),
        )
        .unwrap();

        assert_eq!(doc.title, "From Title Tag");
    }

    #[test]
    fn test_empty_page_yields_empty_document() {
        let doc = extract_html("<html><body><main></main></body></html>", &ExtractConfig::default());
        assert!(doc.is_empty());
        assert!(!doc.title.is_empty());
    }

    #[test]
    fn test_unrecognized_block_tags_are_descended() {
        let doc = extract_html(
            r#"<html><body><main><details>
                <p>Inner paragraph.</p>
                <img src="/inner.png" alt="inner">
            </details></main></body></html>"#,
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph("Inner paragraph.".into()),
                Block::Image {
                    src: "https://example.com/inner.png".into(),
                    alt: "inner".into(),
                    caption: None,
                },
            ]
        );
        assert_eq!(doc.images, vec!["https://example.com/inner.png".to_string()]);
    }

    #[test]
    fn test_definition_list_content_survives() {
        let doc = extract_html(
            "<html><body><main><dl><dt>Term</dt><dd><p>Definition text.</p></dd></dl></main></body></html>",
            &ExtractConfig::default(),
        );

        assert!(doc.blocks.contains(&Block::Paragraph("Definition text.".into())));
    }

    #[test]
    fn test_stray_inline_text_becomes_paragraph() {
        let doc = extract_html(
            "<html><body><main>Loose <em>inline</em> text<p>Real paragraph</p></main></body></html>",
            &ExtractConfig::default(),
        );

        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph("Loose inline text".into()), Block::Paragraph("Real paragraph".into())]
        );
    }
}
