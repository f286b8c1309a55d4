//! The intermediate document model.
//!
//! Extraction converts a parsed page into a [`Document`]: an ordered
//! list of tagged [`Block`]s plus the page metadata. Every downstream
//! consumer (the assembler, the renderers) dispatches on the block tag,
//! never on raw HTML, so adding a block kind means touching the enum and
//! each renderer once.

use serde::Serialize;

use crate::metadata::Metadata;

/// A single content block, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    /// A heading with its level, 1 through 6.
    Heading { level: u8, text: String },
    /// A paragraph of cleaned text.
    Paragraph(String),
    /// An image with its resolved URL and any alt or caption text.
    Image { src: String, alt: String, caption: Option<String> },
    /// Preformatted code, verbatim, with an optional language hint.
    Code { text: String, language: Option<String> },
    /// An ordered or unordered list.
    List { ordered: bool, items: Vec<String> },
    /// A block quotation.
    Quote(String),
    /// A fragment preserved as raw HTML, such as a table.
    Html(String),
}

impl Block {
    /// Plain-text rendering of this block, used for previews and
    /// description fallbacks.
    pub fn text(&self) -> String {
        match self {
            Self::Heading { text, .. } => text.clone(),
            Self::Paragraph(text) | Self::Quote(text) => text.clone(),
            Self::Image { alt, caption, .. } => caption.clone().unwrap_or_else(|| alt.clone()),
            Self::Code { text, .. } => text.clone(),
            Self::List { items, .. } => items.join("\n"),
            Self::Html(html) => html.clone(),
        }
    }
}

/// The extracted content of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// URL the page was fetched from.
    pub source_url: String,
    /// Resolved document title.
    pub title: String,
    /// Content blocks in source order.
    pub blocks: Vec<Block>,
    /// Absolute image URLs referenced by the blocks, first-seen order,
    /// deduplicated.
    pub images: Vec<String>,
    /// Metadata pulled from the page head.
    pub metadata: Metadata,
}

impl Document {
    /// True when extraction produced no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_text() {
        assert_eq!(Block::Paragraph("hello".into()).text(), "hello");
        assert_eq!(Block::Heading { level: 2, text: "Title".into() }.text(), "Title");
        assert_eq!(
            Block::List { ordered: false, items: vec!["a".into(), "b".into()] }.text(),
            "a\nb"
        );
        assert_eq!(
            Block::Image { src: "x.png".into(), alt: "alt".into(), caption: Some("cap".into()) }.text(),
            "cap"
        );
    }

    #[test]
    fn test_document_is_empty() {
        let doc = Document {
            source_url: "https://example.com".into(),
            title: "Empty".into(),
            blocks: vec![],
            images: vec![],
            metadata: Metadata::default(),
        };
        assert!(doc.is_empty());
    }

    #[test]
    fn test_block_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Block::Paragraph("p".into())).unwrap();
        assert!(json.contains(r#""kind":"paragraph""#));

        let json = serde_json::to_string(&Block::Heading { level: 1, text: "h".into() }).unwrap();
        assert!(json.contains(r#""kind":"heading""#));
    }
}
