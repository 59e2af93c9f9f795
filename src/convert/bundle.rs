//! The pipeline's input contract.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything an input adapter hands to the parser.
///
/// `raw_text` is the plain-text view of the manuscript, `html` an optional
/// HTML rendering of the same document, and `math_fragments` the raw OMML or
/// MathML snippets found alongside it. Zero fragments is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    /// UTF-8 plain text
    pub raw_text: String,

    /// HTML rendering of the same document
    pub html: Option<String>,

    /// Math markup fragments as raw XML strings
    pub math_fragments: Vec<String>,
}

impl SourceBundle {
    /// Create a bundle holding only plain text.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            html: None,
            math_fragments: Vec::new(),
        }
    }

    /// Attach an HTML rendering.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Add one math markup fragment.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.math_fragments.push(fragment.into());
        self
    }

    /// Add several math markup fragments.
    pub fn with_fragments<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.math_fragments
            .extend(fragments.into_iter().map(Into::into));
        self
    }

    /// Load every `*.xml` file of a directory as a math fragment, in file name order.
    pub fn with_math_dir<P: AsRef<Path>>(self, dir: P) -> Result<Self> {
        let fragments = read_math_dir(dir.as_ref())?;
        Ok(self.with_fragments(fragments))
    }

    /// Check if the bundle carries no content at all.
    pub fn is_empty(&self) -> bool {
        self.raw_text.trim().is_empty()
            && self.html.as_deref().map_or(true, |h| h.trim().is_empty())
            && self.math_fragments.is_empty()
    }
}

/// Read the `*.xml` fragments of a directory, sorted by file name.
pub(crate) fn read_math_dir(dir: &Path) -> Result<Vec<String>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_xml(p))
        .collect();
    paths.sort();

    let mut fragments = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(&path)?;
        fragments.push(String::from_utf8(bytes)?);
    }
    log::debug!(
        "SourceBundle: {} math fragments from {}",
        fragments.len(),
        dir.display()
    );
    Ok(fragments)
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let bundle = SourceBundle::new("text")
            .with_html("<p>text</p>")
            .with_fragment("<math/>")
            .with_fragments(vec!["<m:oMath/>"]);

        assert_eq!(bundle.raw_text, "text");
        assert!(bundle.html.is_some());
        assert_eq!(bundle.math_fragments.len(), 2);
        assert!(!bundle.is_empty());
        assert!(SourceBundle::default().is_empty());
    }

    #[test]
    fn test_with_math_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xml"), "<math><mi>b</mi></math>").unwrap();
        fs::write(dir.path().join("a.xml"), "<math><mi>a</mi></math>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bundle = SourceBundle::new("x").with_math_dir(dir.path()).unwrap();
        assert_eq!(
            bundle.math_fragments,
            vec!["<math><mi>a</mi></math>", "<math><mi>b</mi></math>"]
        );
    }

    #[test]
    fn test_with_missing_math_dir() {
        let result = SourceBundle::new("x").with_math_dir("/nonexistent/papertex/math");
        assert!(result.is_err());
    }
}
