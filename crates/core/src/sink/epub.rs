//! EPUB 3 output.
//!
//! Writes a zip container with the `mimetype` entry first and stored
//! uncompressed, as the format requires, followed by the OCF container
//! descriptor, the package document, both navigation documents, the
//! stylesheet, one XHTML file per chapter, and any embedded images.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::assemble::Book;
use crate::render::{chapter_xhtml, escape_html, stylesheet};
use crate::sink::{DocumentSink, RenderOptions};
use crate::{Result, WebtomeError};

pub struct EpubSink;

impl DocumentSink for EpubSink {
    fn format(&self) -> &'static str {
        "epub"
    }

    fn write(&self, book: &Book, options: &RenderOptions, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // The mimetype entry must come first and stay uncompressed so
        // readers can identify the container from its opening bytes.
        zip_entry(&mut zip, "mimetype", b"application/epub+zip", stored)?;
        zip_entry(&mut zip, "META-INF/container.xml", CONTAINER_XML.as_bytes(), deflated)?;

        let image_map = image_map(options);

        zip_entry(&mut zip, "OEBPS/content.opf", package_document(book, options).as_bytes(), deflated)?;
        zip_entry(&mut zip, "OEBPS/nav.xhtml", nav_document(book, options).as_bytes(), deflated)?;
        zip_entry(&mut zip, "OEBPS/toc.ncx", ncx_document(book).as_bytes(), deflated)?;
        zip_entry(&mut zip, "OEBPS/style.css", stylesheet().as_bytes(), deflated)?;

        for chapter in &book.chapters {
            let xhtml = chapter_xhtml(chapter, options.language(), &image_map);
            zip_entry(&mut zip, &format!("OEBPS/{}.xhtml", chapter.anchor), xhtml.as_bytes(), deflated)?;
        }

        for image in &options.images {
            zip_entry(&mut zip, &format!("OEBPS/images/{}", image.file_name), &image.bytes, deflated)?;
        }

        if let Some(cover) = &options.cover {
            zip_entry(&mut zip, &format!("OEBPS/{}", cover.file_name), &cover.bytes, deflated)?;
        }

        zip.finish().map_err(|e| zip_error(e.to_string()))?;
        Ok(())
    }
}

fn zip_entry(
    zip: &mut ZipWriter<File>, name: &str, contents: &[u8], options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options).map_err(|e| zip_error(e.to_string()))?;
    zip.write_all(contents)?;
    Ok(())
}

fn zip_error(reason: String) -> WebtomeError {
    WebtomeError::Sink { format: "epub", reason }
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Maps remote image URLs to their packaged paths.
fn image_map(options: &RenderOptions) -> HashMap<String, String> {
    options
        .images
        .iter()
        .map(|img| (img.url.clone(), format!("images/{}", img.file_name)))
        .collect()
}

fn package_document(book: &Book, options: &RenderOptions) -> String {
    let identifier = book
        .chapters
        .first()
        .map_or_else(|| book.title.clone(), |c| c.source_url.clone());
    let modified = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut metadata = String::new();
    metadata.push_str(&format!(
        "    <dc:identifier id=\"book-id\">{}</dc:identifier>\n",
        escape_html(&identifier)
    ));
    metadata.push_str(&format!("    <dc:title>{}</dc:title>\n", escape_html(&book.title)));
    metadata.push_str(&format!("    <dc:language>{}</dc:language>\n", escape_html(options.language())));
    metadata.push_str(&format!("    <meta property=\"dcterms:modified\">{modified}</meta>\n"));
    if let Some(author) = &book.metadata.author {
        metadata.push_str(&format!("    <dc:creator>{}</dc:creator>\n", escape_html(author)));
    }
    if let Some(description) = &book.metadata.description {
        metadata.push_str(&format!("    <dc:description>{}</dc:description>\n", escape_html(description)));
    }
    if let Some(publisher) = &book.metadata.publisher {
        metadata.push_str(&format!("    <dc:publisher>{}</dc:publisher>\n", escape_html(publisher)));
    }
    if let Some(published) = &book.metadata.published {
        metadata.push_str(&format!("    <dc:date>{}</dc:date>\n", escape_html(published)));
    }

    let mut manifest = String::new();
    manifest.push_str(
        "    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
    );
    manifest.push_str("    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n");
    manifest.push_str("    <item id=\"style\" href=\"style.css\" media-type=\"text/css\"/>\n");

    let mut spine = String::new();
    for chapter in &book.chapters {
        manifest.push_str(&format!(
            "    <item id=\"{anchor}\" href=\"{anchor}.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
            anchor = chapter.anchor
        ));
        spine.push_str(&format!("    <itemref idref=\"{}\"/>\n", chapter.anchor));
    }

    for (i, image) in options.images.iter().enumerate() {
        manifest.push_str(&format!(
            "    <item id=\"img-{i}\" href=\"images/{name}\" media-type=\"{media}\"/>\n",
            name = escape_html(&image.file_name),
            media = image.media_type
        ));
    }

    if let Some(cover) = &options.cover {
        manifest.push_str(&format!(
            "    <item id=\"cover-image\" href=\"{name}\" media-type=\"{media}\" properties=\"cover-image\"/>\n",
            name = cover.file_name,
            media = cover.media_type
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
{metadata}  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#
    )
}

fn nav_document(book: &Book, options: &RenderOptions) -> String {
    let mut entries = String::new();
    for entry in &book.toc {
        entries.push_str(&format!(
            "      <li><a href=\"{}.xhtml\">{}</a></li>\n",
            entry.anchor,
            escape_html(&entry.title)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
<title>{title}</title>
</head>
<body>
  <nav epub:type="toc">
    <h1>Contents</h1>
    <ol>
{entries}    </ol>
  </nav>
</body>
</html>
"#,
        lang = escape_html(options.language()),
        title = escape_html(&book.title),
    )
}

/// Legacy NCX navigation, kept for EPUB 2 readers.
fn ncx_document(book: &Book) -> String {
    let identifier = book
        .chapters
        .first()
        .map_or_else(|| book.title.clone(), |c| c.source_url.clone());

    let mut nav_points = String::new();
    for (i, entry) in book.toc.iter().enumerate() {
        let order = i + 1;
        nav_points.push_str(&format!(
            r#"    <navPoint id="np-{order}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{anchor}.xhtml"/>
    </navPoint>
"#,
            title = escape_html(&entry.title),
            anchor = entry.anchor,
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{identifier}"/>
    <meta name="dtb:depth" content="1"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>
"#,
        identifier = escape_html(&identifier),
        title = escape_html(&book.title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{Chapter, TocEntry};
    use crate::cover::generate_svg_cover;
    use crate::document::Block;
    use crate::metadata::Metadata;
    use crate::sink::ImageAsset;
    use std::io::Read;

    fn book() -> Book {
        Book {
            title: "EPUB Sample".to_string(),
            metadata: Metadata {
                author: Some("A. Writer".to_string()),
                description: Some("About things.".to_string()),
                ..Metadata::default()
            },
            chapters: vec![
                Chapter {
                    title: "One".to_string(),
                    anchor: "chapter-1".to_string(),
                    source_url: "https://example.com/1".to_string(),
                    blocks: vec![Block::Paragraph("First.".to_string())],
                    metadata: Metadata::default(),
                },
                Chapter {
                    title: "Two".to_string(),
                    anchor: "chapter-2".to_string(),
                    source_url: "https://example.com/2".to_string(),
                    blocks: vec![Block::Image {
                        src: "https://example.com/pic.png".to_string(),
                        alt: "pic".to_string(),
                        caption: None,
                    }],
                    metadata: Metadata::default(),
                },
            ],
            toc: vec![
                TocEntry { title: "One".to_string(), anchor: "chapter-1".to_string() },
                TocEntry { title: "Two".to_string(), anchor: "chapter-2".to_string() },
            ],
            images: vec!["https://example.com/pic.png".to_string()],
        }
    }

    fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> String {
        let mut contents = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut contents).unwrap();
        contents
    }

    #[test]
    fn test_container_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");

        let options = RenderOptions {
            cover: Some(generate_svg_cover(&Metadata::default())),
            images: vec![ImageAsset {
                url: "https://example.com/pic.png".to_string(),
                file_name: "image_1.png".to_string(),
                media_type: "image/png",
                bytes: vec![0x89, b'P', b'N', b'G'],
            }],
            ..RenderOptions::default()
        };
        EpubSink.write(&book(), &options, &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();

        // First entry must be the uncompressed mimetype.
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        drop(first);

        for name in [
            "META-INF/container.xml",
            "OEBPS/content.opf",
            "OEBPS/nav.xhtml",
            "OEBPS/toc.ncx",
            "OEBPS/style.css",
            "OEBPS/chapter-1.xhtml",
            "OEBPS/chapter-2.xhtml",
            "OEBPS/images/image_1.png",
            "OEBPS/cover.svg",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing entry {name}");
        }
    }

    #[test]
    fn test_package_document_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        EpubSink.write(&book(), &RenderOptions::default(), &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let opf = read_entry(&mut archive, "OEBPS/content.opf");

        assert!(opf.contains("<dc:title>EPUB Sample</dc:title>"));
        assert!(opf.contains("<dc:creator>A. Writer</dc:creator>"));
        assert!(opf.contains("<dc:identifier id=\"book-id\">https://example.com/1</dc:identifier>"));
        assert!(opf.contains("dcterms:modified"));
        assert!(opf.contains("<itemref idref=\"chapter-1\"/>"));
        assert!(opf.contains("<itemref idref=\"chapter-2\"/>"));
    }

    #[test]
    fn test_embedded_image_rewritten_to_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");

        let options = RenderOptions {
            images: vec![ImageAsset {
                url: "https://example.com/pic.png".to_string(),
                file_name: "image_1.png".to_string(),
                media_type: "image/png",
                bytes: vec![0x89, b'P', b'N', b'G'],
            }],
            ..RenderOptions::default()
        };
        EpubSink.write(&book(), &options, &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let chapter = read_entry(&mut archive, "OEBPS/chapter-2.xhtml");
        assert!(chapter.contains(r#"src="images/image_1.png""#));
    }

    #[test]
    fn test_nav_lists_every_chapter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        EpubSink.write(&book(), &RenderOptions::default(), &path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let nav = read_entry(&mut archive, "OEBPS/nav.xhtml");
        assert!(nav.contains(r#"<a href="chapter-1.xhtml">One</a>"#));
        assert!(nav.contains(r#"<a href="chapter-2.xhtml">Two</a>"#));
    }
}
