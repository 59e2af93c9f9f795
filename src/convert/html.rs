//! HTML input adapter.

use crate::detect::decode_text;
use crate::error::Result;
use crate::parser::HtmlSource;

use super::{InputAdapter, SourceBundle};

/// Reads an HTML rendering of a manuscript.
///
/// The plain-text view is one line per block element; the HTML itself is
/// kept so native tables, math-font spans and `<math>` elements stay
/// available to the extractors.
#[derive(Debug, Clone, Default)]
pub struct HtmlAdapter {
    _private: (),
}

impl HtmlAdapter {
    /// Create a new HTML adapter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl InputAdapter for HtmlAdapter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<SourceBundle> {
        let html = decode_text(bytes)?;
        let text = HtmlSource::parse(&html).text_lines().join("\n");
        log::debug!(
            "HtmlAdapter: {} bytes of HTML, {} bytes of text",
            html.len(),
            text.len()
        );
        Ok(SourceBundle::new(text).with_html(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_bytes() {
        let html = b"<html><body><h1>A Title</h1><p>J. Doe</p><p>1. Introduction</p></body></html>";
        let bundle = HtmlAdapter::new().load_bytes(html).unwrap();

        assert_eq!(bundle.raw_text, "A Title\nJ. Doe\n1. Introduction");
        assert!(bundle.html.as_deref().is_some_and(|h| h.contains("<h1>")));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        assert!(HtmlAdapter::new().load_bytes(b"<p>\xC3\x28</p>").is_err());
    }
}
