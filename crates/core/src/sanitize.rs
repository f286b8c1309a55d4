//! Streaming HTML cleanup applied before parsing.
//!
//! Strips comments and rewrites `href`/`src` attributes to absolute URLs
//! so every page entering the pipeline carries resolvable references,
//! no matter how the site wrote them.

use lol_html::{HtmlRewriter, Settings, doc_comments, element};
use url::Url;

/// Cleans raw HTML ahead of parsing.
///
/// Removes comments and, when a base URL is known, converts relative
/// `a[href]`, `img[src]`, and `link[href]` references to absolute URLs.
/// On any rewriter failure the original input is returned unchanged;
/// sanitation is best-effort and must never lose a page.
pub fn sanitize_html(html: &str, base_url: Option<&Url>) -> String {
    let mut handlers = Vec::new();

    if let Some(base) = base_url {
        for (tag, attr) in [("a", "href"), ("img", "src"), ("link", "href")] {
            let base = base.clone();
            handlers.push(element!(tag, move |el| {
                if let Some(value) = el.get_attribute(attr)
                    && let Ok(absolute) = base.join(&value)
                {
                    el.set_attribute(attr, absolute.as_str()).ok();
                }
                Ok(())
            }));
        }
    }

    let mut output = String::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..Settings::default()
        },
        |chunk: &[u8]| {
            output.push_str(&String::from_utf8_lossy(chunk));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() && !html.is_empty() { html.to_string() } else { output }
}
