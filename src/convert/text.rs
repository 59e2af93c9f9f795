//! Plain-text input adapter.

use crate::detect::{decode_text, detect_format_from_bytes};
use crate::error::Result;

use super::{InputAdapter, SourceBundle};

/// Reads UTF-8 plain text manuscripts.
///
/// Bytes that sniff as an archive or a PDF are rejected even when the file
/// carries a text extension.
#[derive(Debug, Clone, Default)]
pub struct TextAdapter {
    _private: (),
}

impl TextAdapter {
    /// Create a new text adapter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl InputAdapter for TextAdapter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<SourceBundle> {
        detect_format_from_bytes(bytes)?;
        let text = decode_text(bytes)?;
        Ok(SourceBundle::new(text))
    }
}
