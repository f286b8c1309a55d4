//! HTML parsing and element access.
//!
//! This module provides the [`Page`] and [`Element`] types for parsing an
//! HTML page and navigating it with CSS selectors. A `Page` is the raw
//! parsed tree; the content and metadata extractors read from it, the
//! crawl frontier scans it for outgoing links.
//!
//! # Example
//!
//! ```rust
//! use webtome_core::parse::Page;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Test</title></head>
//!         <body><p class="lead">Hello</p></body>
//!     </html>
//! "#;
//!
//! let page = Page::parse(html);
//! assert_eq!(page.title(), Some("Test".to_string()));
//! let leads = page.select("p.lead").unwrap();
//! assert_eq!(leads[0].text(), "Hello");
//! ```

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{Result, WebtomeError};

/// Parses a CSS selector, mapping failures to [`WebtomeError::HtmlParseError`].
pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WebtomeError::HtmlParseError(format!("Invalid selector '{selector}': {e}")))
}

/// A parsed HTML page.
///
/// Wraps the parsed tree together with the URL it was fetched from, so
/// extractors can resolve relative references and derive URL-based
/// metadata fallbacks.
pub struct Page {
    html: Html,
    url: Option<Url>,
}

impl Page {
    /// Parses HTML from a string.
    ///
    /// The underlying parser is lenient: malformed markup is repaired
    /// rather than rejected, so this never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html), url: None }
    }

    /// Parses HTML and records the URL the page came from.
    pub fn parse_with_url(html: &str, url: Url) -> Self {
        Self { html: Html::parse_document(html), url: Some(url) }
    }

    /// The URL this page was fetched from, if known.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The underlying parsed tree.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The document root element (`<html>`).
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WebtomeError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(Element::new))
    }

    /// The content of the `<title>` element, trimmed, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let title = self.html.select(&selector).next()?.text().collect::<String>();
        let title = title.trim();
        if title.is_empty() { None } else { Some(title.to_string()) }
    }

    /// Looks up a meta tag's `content` by its `name` or `property` attribute.
    ///
    /// Covers both classic meta tags (`name="author"`) and Open Graph /
    /// article tags (`property="og:title"`). Empty content counts as absent.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        for attr in ["name", "property"] {
            let selector = format!("meta[{attr}=\"{key}\"]");
            if let Ok(sel) = Selector::parse(&selector)
                && let Some(el) = self.html.select(&sel).next()
                && let Some(content) = el.value().attr("content")
            {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
        None
    }
}

/// A single element in a parsed page.
///
/// Thin wrapper around `scraper::ElementRef` exposing the accessors the
/// rest of the pipeline needs.
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// The underlying `ElementRef` for tree traversal.
    pub fn as_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Concatenated text of all text nodes under this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// The value of an attribute, or `None` if absent.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// The lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// The HTML content including this element's own tags.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>  Test Page  </title>
            <meta name="author" content="Jo Writer">
            <meta property="og:title" content="OG Title">
        </head>
        <body>
            <h1>Heading</h1>
            <p class="lead">First</p>
            <p class="lead">Second</p>
            <a href="https://example.com/next">Next</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_title_is_trimmed() {
        let page = Page::parse(SAMPLE_HTML);
        assert_eq!(page.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let page = Page::parse(SAMPLE_HTML);
        let elements = page.select("p.lead").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "First");
        assert_eq!(elements[1].text(), "Second");
    }

    #[test]
    fn test_select_first() {
        let page = Page::parse(SAMPLE_HTML);
        let first = page.select_first("p.lead").unwrap().unwrap();
        assert_eq!(first.text(), "First");

        assert!(page.select_first("section").unwrap().is_none());
    }

    #[test]
    fn test_meta_content_by_name_and_property() {
        let page = Page::parse(SAMPLE_HTML);
        assert_eq!(page.meta_content("author"), Some("Jo Writer".to_string()));
        assert_eq!(page.meta_content("og:title"), Some("OG Title".to_string()));
        assert_eq!(page.meta_content("missing"), None);
    }

    #[test]
    fn test_element_attributes() {
        let page = Page::parse(SAMPLE_HTML);
        let links = page.select("a").unwrap();
        assert_eq!(links[0].attr("href"), Some("https://example.com/next"));
        assert_eq!(links[0].tag_name(), "a");
    }

    #[test]
    fn test_invalid_selector() {
        let page = Page::parse(SAMPLE_HTML);
        let result = page.select("[[nope");
        assert!(matches!(result, Err(WebtomeError::HtmlParseError(_))));
    }

    #[test]
    fn test_parse_with_url() {
        let url = Url::parse("https://example.com/a").unwrap();
        let page = Page::parse_with_url("<html><body></body></html>", url.clone());
        assert_eq!(page.url(), Some(&url));
    }
}
