//! Detected front-matter elements.

use serde::{Deserialize, Serialize};

/// A front-matter element recovered by a heuristic detector.
///
/// `confidence` is a heuristic score, not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedElement {
    /// Recovered text (empty when not detected)
    pub text: String,

    /// Heuristic score in `[0, 1]`
    pub confidence: f32,

    /// Human-readable explanation of the decision
    pub reasoning: String,

    /// Line index where the element was found
    pub line: Option<usize>,
}

impl DetectedElement {
    /// Create a detected element.
    pub fn detected(
        text: impl Into<String>,
        confidence: f32,
        reasoning: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            line: Some(line),
        }
    }

    /// Create the explicit "not detected" state.
    pub fn not_detected(reasoning: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            reasoning: reasoning.into(),
            line: None,
        }
    }

    /// Whether the element was found.
    pub fn is_detected(&self) -> bool {
        self.confidence > 0.0 && !self.text.is_empty()
    }

    /// Text if detected.
    pub fn as_option(&self) -> Option<&str> {
        if self.is_detected() {
            Some(&self.text)
        } else {
            None
        }
    }

    /// Text if detected, otherwise the given fallback.
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.as_option().unwrap_or(fallback)
    }
}

impl Default for DetectedElement {
    fn default() -> Self {
        Self::not_detected("not analyzed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_detected() {
        let element = DetectedElement::not_detected("no abstract marker");
        assert!(!element.is_detected());
        assert_eq!(element.confidence, 0.0);
        assert_eq!(element.text_or("Untitled"), "Untitled");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let element = DetectedElement::detected("Title", 1.4, "first line", 0);
        assert_eq!(element.confidence, 1.0);
        assert_eq!(element.as_option(), Some("Title"));
    }
}
