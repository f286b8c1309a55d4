//! Cover art.
//!
//! When the user supplies no cover image, a simple SVG cover is drawn
//! from the book metadata. A user-supplied file wins over generation.

use std::fs;
use std::path::Path;

use crate::metadata::Metadata;
use crate::render::escape_html;
use crate::{Result, WebtomeError};

const COVER_WIDTH: u32 = 1200;
const COVER_HEIGHT: u32 = 1800;
const TITLE_WRAP: usize = 22;
const TITLE_MAX_LINES: usize = 3;

/// A cover image ready for packaging.
#[derive(Debug, Clone)]
pub struct CoverArt {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    pub file_name: &'static str,
}

/// Generates an SVG cover from book metadata.
///
/// The title wraps onto up to three lines; author and site name render
/// below it when present.
pub fn generate_svg_cover(metadata: &Metadata) -> CoverArt {
    let title = metadata.title.as_deref().unwrap_or("Untitled");
    let title_lines = wrap_title(title);

    let mut text = String::new();
    let mut y = 700;
    for line in &title_lines {
        text.push_str(&format!(
            r##"<text x="600" y="{y}" text-anchor="middle" font-family="Georgia, serif" font-size="88" fill="#f3ede2">{}</text>"##,
            escape_html(line)
        ));
        text.push('\n');
        y += 110;
    }

    if let Some(author) = &metadata.author {
        y += 80;
        text.push_str(&format!(
            r##"<text x="600" y="{y}" text-anchor="middle" font-family="Georgia, serif" font-size="52" fill="#c9c0ae">{}</text>"##,
            escape_html(author)
        ));
        text.push('\n');
    }

    if let Some(site) = &metadata.site_name {
        text.push_str(&format!(
            r##"<text x="600" y="1680" text-anchor="middle" font-family="Georgia, serif" font-size="40" fill="#8d8672">{}</text>"##,
            escape_html(site)
        ));
        text.push('\n');
    }

    let svg = format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{COVER_WIDTH}" height="{COVER_HEIGHT}" viewBox="0 0 {COVER_WIDTH} {COVER_HEIGHT}">
<rect width="{COVER_WIDTH}" height="{COVER_HEIGHT}" fill="#2b3a4a"/>
<rect x="60" y="60" width="{inner_w}" height="{inner_h}" fill="none" stroke="#c9c0ae" stroke-width="4"/>
{text}</svg>
"##,
        inner_w = COVER_WIDTH - 120,
        inner_h = COVER_HEIGHT - 120,
    );

    CoverArt { bytes: svg.into_bytes(), media_type: "image/svg+xml", file_name: "cover.svg" }
}

/// Loads a user-supplied cover image from disk.
///
/// # Errors
///
/// Returns [`WebtomeError::FileNotFound`] for a missing path and
/// [`WebtomeError::Sink`] for an unrecognized image type.
pub fn load_cover(path: &Path) -> Result<CoverArt> {
    if !path.exists() {
        return Err(WebtomeError::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;

    let (media_type, file_name) = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => ("image/png", "cover.png"),
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
            ("image/jpeg", "cover.jpg")
        }
        Some(ext) if ext.eq_ignore_ascii_case("svg") => ("image/svg+xml", "cover.svg"),
        _ => {
            return Err(WebtomeError::Sink {
                format: "cover",
                reason: format!("unsupported cover image type: {}", path.display()),
            });
        }
    };

    Ok(CoverArt { bytes, media_type, file_name })
}

/// Greedy word wrap capped at [`TITLE_MAX_LINES`], with an ellipsis when
/// the title overflows.
fn wrap_title(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > TITLE_WRAP {
            lines.push(std::mem::take(&mut current));
            if lines.len() == TITLE_MAX_LINES {
                break;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if lines.len() == TITLE_MAX_LINES {
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    } else if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push("Untitled".to_string());
    }
    lines
}
