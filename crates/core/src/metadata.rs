//! Page metadata extraction.
//!
//! Each field is resolved through a fixed priority chain of sources,
//! from the most explicit markup down to URL-derived fallbacks. Every
//! field stays optional; absence is represented as `None`, never as an
//! empty string or a dummy value.

use serde::Serialize;
use url::Url;

use crate::parse::Page;

/// Metadata pulled from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub publisher: Option<String>,
    pub site_name: Option<String>,
    pub canonical_url: Option<String>,
    pub language: Option<String>,
}

impl Page {
    /// Extracts all metadata fields from this page.
    ///
    /// `page_url` feeds the URL-based fallbacks for title and site name.
    pub fn extract_metadata(&self, page_url: &Url) -> Metadata {
        Metadata {
            title: self.meta_title(page_url),
            author: self.meta_author(),
            description: self.meta_description(),
            published: self.meta_published(),
            publisher: self.meta_content("article:publisher"),
            site_name: self.meta_site_name(page_url),
            canonical_url: self.meta_canonical(),
            language: self.meta_language(),
        }
    }

    /// Title chain: `og:title`, `<title>`, first `<h1>`, URL slug.
    fn meta_title(&self, page_url: &Url) -> Option<String> {
        if let Some(title) = self.meta_content("og:title") {
            return Some(title);
        }
        if let Some(title) = self.title() {
            return Some(title);
        }
        if let Ok(Some(h1)) = self.select_first("h1") {
            let text = collapse_whitespace(&h1.text());
            if !text.is_empty() {
                return Some(text);
            }
        }
        url_slug(page_url)
    }

    /// Author chain: `meta[name=author]`, `article:author`, any element
    /// marked `itemprop="author"`.
    fn meta_author(&self) -> Option<String> {
        if let Some(author) = self.meta_content("author") {
            return Some(author);
        }
        if let Some(author) = self.meta_content("article:author") {
            return Some(author);
        }
        if let Ok(Some(el)) = self.select_first("[itemprop=\"author\"]") {
            let text = collapse_whitespace(&el.text());
            if !text.is_empty() {
                return Some(text);
            }
        }
        None
    }

    /// Description chain: `og:description`, `meta[name=description]`,
    /// the first paragraph truncated to roughly 200 characters.
    fn meta_description(&self) -> Option<String> {
        if let Some(desc) = self.meta_content("og:description") {
            return Some(desc);
        }
        if let Some(desc) = self.meta_content("description") {
            return Some(desc);
        }
        if let Ok(paragraphs) = self.select("p") {
            for p in paragraphs {
                let text = collapse_whitespace(&p.text());
                if text.len() >= 50 {
                    return Some(truncate_chars(&text, 200));
                }
            }
        }
        None
    }

    /// Publication date chain: `article:published_time`,
    /// `meta[name=date]`, the first `<time datetime>` attribute.
    ///
    /// The value is passed through as the page states it; no date
    /// parsing or normalization is attempted.
    fn meta_published(&self) -> Option<String> {
        if let Some(date) = self.meta_content("article:published_time") {
            return Some(date);
        }
        if let Some(date) = self.meta_content("date") {
            return Some(date);
        }
        if let Ok(Some(el)) = self.select_first("time[datetime]") {
            return el.attr("datetime").map(str::to_string);
        }
        None
    }

    /// Site name chain: `og:site_name`, the URL host.
    fn meta_site_name(&self, page_url: &Url) -> Option<String> {
        if let Some(name) = self.meta_content("og:site_name") {
            return Some(name);
        }
        page_url.host_str().map(str::to_string)
    }

    /// The `link[rel=canonical]` href, if present and non-empty.
    fn meta_canonical(&self) -> Option<String> {
        if let Ok(Some(link)) = self.select_first("link[rel=\"canonical\"]") {
            let href = link.attr("href")?.trim();
            if !href.is_empty() {
                return Some(href.to_string());
            }
        }
        None
    }

    /// Language chain: `html[lang]`, `meta[http-equiv=content-language]`.
    fn meta_language(&self) -> Option<String> {
        if let Ok(Some(html)) = self.select_first("html") {
            if let Some(lang) = html.attr("lang") {
                let lang = lang.trim();
                if !lang.is_empty() {
                    return Some(lang.to_string());
                }
            }
        }
        if let Ok(Some(meta)) = self.select_first("meta[http-equiv=\"content-language\"]") {
            if let Some(lang) = meta.attr("content") {
                let lang = lang.trim();
                if !lang.is_empty() {
                    return Some(lang.to_string());
                }
            }
        }
        None
    }
}

/// Collapses internal whitespace runs to single spaces and trims.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates at a char boundary, appending an ellipsis when cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

/// Derives a readable title from the last URL path segment.
pub(crate) fn url_slug(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
    let words = stem.replace(['-', '_'], " ");
    let words = collapse_whitespace(&words);
    if words.is_empty() { None } else { Some(words) }
}
