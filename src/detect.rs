//! Input format detection.
//!
//! Manuscripts reach the pipeline as plain text, as an HTML rendering, or as
//! standalone math markup. Word-processor archives and PDFs are recognized
//! only so they can be rejected with a clear message; converting them is the
//! job of an external tool.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes inspected when sniffing a file.
const SNIFF_LEN: usize = 4096;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Recognized input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// UTF-8 plain text
    PlainText,
    /// HTML rendering of a manuscript
    Html,
    /// A standalone OMML or MathML fragment
    MathXml,
}

impl InputFormat {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::PlainText => "text",
            InputFormat::Html => "html",
            InputFormat::MathXml => "math-xml",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Detect the input format of a file from its leading bytes.
///
/// # Example
/// ```no_run
/// use papertex::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("paper.html").unwrap();
/// println!("format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the input format from bytes.
///
/// # Returns
/// * `Err(Error::UnsupportedFormat)` for zip archives and PDFs
/// * `Err(Error::Encoding)` for UTF-16 or otherwise non-UTF-8 data
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    if data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnsupportedFormat(
            "zip archive (convert the document to text or HTML first)".into(),
        ));
    }
    if data.starts_with(PDF_MAGIC) {
        return Err(Error::UnsupportedFormat(
            "PDF (convert the document to text or HTML first)".into(),
        ));
    }
    check_utf16(data)?;

    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        // A sniff window may cut a multi-byte character at its end.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&data[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(e) => return Err(Error::Encoding(e.to_string())),
    };

    Ok(classify_text(text))
}

/// Decode manuscript bytes as UTF-8, dropping a byte-order mark.
pub fn decode_text(data: &[u8]) -> Result<String> {
    check_utf16(data)?;
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    Ok(String::from_utf8(data.to_vec())?)
}

/// Check if bytes look like an HTML document.
pub fn is_html_bytes(data: &[u8]) -> bool {
    matches!(detect_format_from_bytes(data), Ok(InputFormat::Html))
}

fn check_utf16(data: &[u8]) -> Result<()> {
    if data.starts_with(UTF16_LE_BOM) || data.starts_with(UTF16_BE_BOM) {
        return Err(Error::Encoding(
            "UTF-16 input is not supported; re-encode as UTF-8".into(),
        ));
    }
    Ok(())
}

fn classify_text(text: &str) -> InputFormat {
    let head = text.trim_start();
    let lower: String = head.chars().take(512).collect::<String>().to_lowercase();

    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return InputFormat::Html;
    }
    if lower.starts_with("<?xml") {
        if lower.contains("<html") {
            return InputFormat::Html;
        }
        return InputFormat::MathXml;
    }
    if lower.starts_with("<m:omath") || lower.starts_with("<omath") || lower.starts_with("<math")
    {
        return InputFormat::MathXml;
    }
    if lower.starts_with('<')
        && ["<body", "<p>", "<p ", "<div", "<table", "<h1"]
            .iter()
            .any(|tag| lower.contains(tag))
    {
        return InputFormat::Html;
    }
    InputFormat::PlainText
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_plain_text() {
        let format = detect_format_from_bytes(b"Paper Title\nJ. Doe\n").unwrap();
        assert_eq!(format, InputFormat::PlainText);
        assert_eq!(detect_format_from_bytes(b"").unwrap(), InputFormat::PlainText);
    }

    #[test]
    fn test_detect_html() {
        assert_eq!(
            detect_format_from_bytes(b"<!DOCTYPE html><html><body></body></html>").unwrap(),
            InputFormat::Html
        );
        assert_eq!(
            detect_format_from_bytes(b"  <div><p>Title</p></div>").unwrap(),
            InputFormat::Html
        );
        assert!(is_html_bytes(b"<html><p>x</p></html>"));
    }

    #[test]
    fn test_detect_math_xml() {
        let omml = br#"<m:oMath xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"/>"#;
        assert_eq!(detect_format_from_bytes(omml).unwrap(), InputFormat::MathXml);
        assert_eq!(
            detect_format_from_bytes(b"<?xml version=\"1.0\"?><math><mi>x</mi></math>").unwrap(),
            InputFormat::MathXml
        );
    }

    #[test]
    fn test_reject_archives_and_pdf() {
        let result = detect_format_from_bytes(b"PK\x03\x04\x14\x00\x06\x00");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

        let result = detect_format_from_bytes(b"%PDF-1.7\n");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_reject_bad_encoding() {
        let result = detect_format_from_bytes(b"\xFF\xFEP\x00a\x00");
        assert!(matches!(result, Err(Error::Encoding(_))));

        let result = detect_format_from_bytes(b"abc\xC3\x28def");
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[test]
    fn test_truncated_multibyte_at_window_end() {
        // "é" cut after its first byte
        let format = detect_format_from_bytes(b"caf\xC3").unwrap();
        assert_eq!(format, InputFormat::PlainText);
    }

    #[test]
    fn test_decode_text_strips_bom() {
        let text = decode_text(b"\xEF\xBB\xBFTitle").unwrap();
        assert_eq!(text, "Title");
        assert!(matches!(decode_text(b"\xC3\x28"), Err(Error::Encoding(_))));
    }
}
