//! Parsing options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for structure extraction.
///
/// All thresholds are empirically tuned; they are exposed so callers can
/// adjust them without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Normalize lines to Unicode NFC and expand ligatures
    pub normalize_unicode: bool,

    /// Table extraction thresholds
    pub tables: TableOptions,

    /// Equation extraction thresholds
    pub equations: EquationOptions,

    /// Front-matter detection bounds
    pub front_matter: FrontMatterOptions,

    /// Minimum character count for the synthetic fallback section
    pub fallback_min_chars: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enable or disable Unicode normalization.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Set table options.
    pub fn with_table_options(mut self, tables: TableOptions) -> Self {
        self.tables = tables;
        self
    }

    /// Set equation options.
    pub fn with_equation_options(mut self, equations: EquationOptions) -> Self {
        self.equations = equations;
        self
    }

    /// Set the minimum equation confidence.
    pub fn with_min_equation_confidence(mut self, confidence: f32) -> Self {
        self.equations.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set front-matter options.
    pub fn with_front_matter_options(mut self, front_matter: FrontMatterOptions) -> Self {
        self.front_matter = front_matter;
        self
    }

    /// Set the fallback section minimum length.
    pub fn with_fallback_min_chars(mut self, chars: usize) -> Self {
        self.fallback_min_chars = chars;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            tables: TableOptions::default(),
            equations: EquationOptions::default(),
            front_matter: FrontMatterOptions::default(),
            fallback_min_chars: 40,
        }
    }
}

/// Table extraction thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Token overlap with the caption above which a row is a duplicate heading
    pub caption_token_overlap: f32,

    /// Normalized text similarity above which a row is a duplicate heading
    pub caption_similarity: f32,

    /// Read `<table>` elements from the HTML rendering
    pub use_html_tables: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            caption_token_overlap: 0.7,
            caption_similarity: 0.8,
            use_html_tables: true,
        }
    }
}

/// Equation extraction thresholds and detector switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquationOptions {
    /// Detections below this score are dropped
    pub min_confidence: f32,

    /// Parse math markup fragments
    pub markup: bool,

    /// Scan `$…$`, `\[…\]` and friends
    pub delimiters: bool,

    /// Scan HTML spans set in a math font
    pub font_hints: bool,

    /// Scan Unicode symbol runs and assignment-shaped lines
    pub symbol_runs: bool,

    /// Font families treated as math fonts (lower-case substrings)
    pub math_fonts: Vec<String>,
}

impl Default for EquationOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.35,
            markup: true,
            delimiters: true,
            font_hints: true,
            symbol_runs: true,
            math_fonts: vec![
                "cambria math".to_string(),
                "stix".to_string(),
                "latin modern math".to_string(),
                "symbol".to_string(),
                "math".to_string(),
            ],
        }
    }
}

/// Front-matter detection bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatterOptions {
    /// Number of leading lines searched for a title
    pub title_window: usize,

    /// Minimum title length in characters
    pub title_min_chars: usize,

    /// Maximum title length in characters
    pub title_max_chars: usize,

    /// Maximum author line length in characters
    pub author_max_chars: usize,

    /// Number of lines after the title searched for authors
    pub author_window: usize,
}

impl Default for FrontMatterOptions {
    fn default() -> Self {
        Self {
            title_window: 5,
            title_min_chars: 5,
            title_max_chars: 250,
            author_max_chars: 200,
            author_window: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .with_normalization(false)
            .with_min_equation_confidence(0.6)
            .with_fallback_min_chars(10);

        assert!(!options.normalize_unicode);
        assert_eq!(options.equations.min_confidence, 0.6);
        assert_eq!(options.fallback_min_chars, 10);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert!(options.normalize_unicode);
        assert_eq!(options.tables.caption_token_overlap, 0.7);
        assert_eq!(options.tables.caption_similarity, 0.8);
        assert_eq!(options.front_matter.title_window, 5);
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            ParseOptions::from_json(r#"{ "tables": { "caption_similarity": 0.9 } }"#).unwrap();
        assert_eq!(options.tables.caption_similarity, 0.9);
        assert_eq!(options.tables.caption_token_overlap, 0.7);
        assert!(options.equations.markup);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(ParseOptions::from_json("{ not json").is_err());
    }
}
