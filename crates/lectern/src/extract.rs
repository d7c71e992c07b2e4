//! Document text extraction and cleanup.
//!
//! Turns uploaded bytes into clean plain text keyed by file extension:
//! PDF via `pdf-extract`, DOCX via ZIP + `word/document.xml`, and
//! everything else as lossy UTF-8. Extraction is followed by
//! [`clean_text`], a line-level filter that strips page numbers and
//! publishing artifacts before the text reaches the chunker.

use std::io::Read;

use anyhow::{Context, Result};
use tracing::debug;

/// Zip-bomb protection for OOXML entries.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Lines shorter than this are treated as extraction artifacts.
const MIN_LINE_CHARS: usize = 3;

/// Extract clean text from a document's raw bytes.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String> {
    let lower = filename.to_lowercase();

    let raw = if lower.ends_with(".pdf") {
        pdf_extract::extract_text_from_mem(bytes)
            .with_context(|| format!("PDF extraction failed for {filename}"))?
    } else if lower.ends_with(".docx") {
        extract_docx(bytes).with_context(|| format!("DOCX extraction failed for {filename}"))?
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    let cleaned = clean_text(&raw);
    debug!(
        filename,
        raw_chars = raw.chars().count(),
        clean_chars = cleaned.chars().count(),
        "extracted document text"
    );
    Ok(cleaned)
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
    let entry = archive.by_name("word/document.xml")?;

    let mut xml = Vec::new();
    entry.take(MAX_XML_ENTRY_BYTES).read_to_end(&mut xml)?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        anyhow::bail!("word/document.xml exceeds size limit");
    }

    collect_text_runs(&xml)
}

/// Concatenate the `<w:t>` text runs of a WordprocessingML body,
/// separating paragraphs with newlines so downstream line filters see
/// document structure.
fn collect_text_runs(xml: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) if in_text_run => {
                out.push_str(t.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => anyhow::bail!("malformed document XML: {e}"),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Strip extraction artifacts line by line, then collapse whitespace.
///
/// Dropped lines: blanks, lines shorter than [`MIN_LINE_CHARS`], page
/// numbers, standalone numbers, and publishing metadata (copyright,
/// ISBN, folio and reference markers, bare chapter/section headings).
pub fn clean_text(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .filter(|line| !is_artifact_line(line))
        .collect();

    kept.join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_artifact_line(line: &str) -> bool {
    let lower = line.to_lowercase();

    if line.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if is_labelled_number(&lower, "page")
        || is_labelled_number(&lower, "chapter")
        || is_labelled_number(&lower, "section")
    {
        return true;
    }
    if lower.starts_with("isbn") {
        return true;
    }
    if lower.contains("copyright ©") || lower.contains("copyright (c)") {
        return true;
    }
    if lower.contains("blind folio") || lower.contains("compref") {
        return true;
    }
    false
}

/// Matches lines of the form `"<label> 12"` and nothing else.
fn is_labelled_number(lower: &str, label: &str) -> bool {
    match lower.strip_prefix(label) {
        Some(rest) => {
            let rest = rest.trim();
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_text_passes_through_cleaned() {
        let text = extract_text("notes.txt", b"Cats are mammals.\nDogs are mammals too.").unwrap();
        assert_eq!(text, "Cats are mammals. Dogs are mammals too.");
    }

    #[test]
    fn unknown_extensions_decode_as_text() {
        let text = extract_text("notes.data", b"some raw content").unwrap();
        assert_eq!(text, "some raw content");
    }

    #[test]
    fn invalid_pdf_is_an_error() {
        assert!(extract_text("broken.pdf", b"not a pdf").is_err());
    }

    #[test]
    fn invalid_docx_is_an_error() {
        assert!(extract_text("broken.docx", b"not a zip").is_err());
    }

    #[test]
    fn docx_text_runs_are_extracted() {
        let document_xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
                <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;

        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            writer
                .start_file(
                    "word/document.xml",
                    zip::write::SimpleFileOptions::default(),
                )
                .unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let text = extract_text("report.docx", &buf).unwrap();
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
    }

    #[test]
    fn clean_text_strips_artifacts() {
        let raw = "Page 12\n42\nReal content about databases.\nISBN: 978-1-23456-789-0\nMore real content here.\nChapter 3\n";
        let cleaned = clean_text(raw);
        assert_eq!(
            cleaned,
            "Real content about databases. More real content here."
        );
    }

    #[test]
    fn clean_text_keeps_prose_mentioning_pages() {
        // Only bare "Page N" lines are artifacts, not sentences about pages.
        let cleaned = clean_text("The page count is twelve.\nPage 7\n");
        assert_eq!(cleaned, "The page count is twelve.");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        let cleaned = clean_text("alpha   beta\n\n\ngamma\t delta\n");
        assert_eq!(cleaned, "alpha beta gamma delta");
    }

    #[test]
    fn clean_text_drops_tiny_lines() {
        let cleaned = clean_text("ok\nA real line of content.\nx\n");
        assert_eq!(cleaned, "A real line of content.");
    }
}
