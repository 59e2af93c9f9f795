//! Equation types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mathematical expression recovered from the manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    /// 1-indexed id, referenced by `[EQUATION_<id>]`
    pub id: usize,

    /// Text as found in the source (including delimiters)
    pub raw_content: String,

    /// Normalized LaTeX notation
    pub canonical_form: String,

    /// Detector that produced the accepted hit
    pub method: DetectionMethod,

    /// Heuristic score in `[0, 1]`
    pub confidence: f32,

    /// Where the equation was found
    pub source: EquationSource,

    /// Text around the hit (the containing line, or the paired trigger sentence)
    pub surrounding_context: String,

    /// Contextual insertion point for equations without a text position
    pub trigger: Option<ContextTrigger>,
}

impl Equation {
    /// Placeholder token for this equation.
    pub fn placeholder(&self) -> String {
        format!("[EQUATION_{}]", self.id)
    }

    /// LaTeX label (`eq:<id>`).
    pub fn label(&self) -> String {
        format!("eq:{}", self.id)
    }

    /// Line index of the hit when it came from the plain text.
    pub fn line(&self) -> Option<usize> {
        match self.source {
            EquationSource::Text { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Key used for ordering ties: text positions first, then fragments, then HTML.
    pub fn position_key(&self) -> (usize, usize, usize) {
        self.source.position_key()
    }
}

/// Detector that found an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// OMML / MathML fragment, structurally parsed
    Markup,
    /// OMML / MathML fragment, flattened after a structural failure
    MarkupFlattened,
    /// `$$…$$` or `\[…\]`
    DisplayDelimiter,
    /// `$…$` or `\(…\)`
    InlineDelimiter,
    /// Literal `\frac` / `\sum` outside delimiters
    ControlSequence,
    /// HTML span rendered in a math font
    FontHint,
    /// Run of Unicode operators / Greek letters
    SymbolRun,
    /// `identifier = expression` line
    Assignment,
}

impl DetectionMethod {
    /// Base confidence of the detector.
    pub fn base_confidence(&self) -> f32 {
        match self {
            DetectionMethod::Markup => 0.95,
            DetectionMethod::DisplayDelimiter => 0.9,
            DetectionMethod::InlineDelimiter => 0.85,
            DetectionMethod::ControlSequence => 0.8,
            DetectionMethod::MarkupFlattened => 0.7,
            DetectionMethod::FontHint => 0.65,
            DetectionMethod::SymbolRun => 0.45,
            DetectionMethod::Assignment => 0.4,
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionMethod::Markup => "markup",
            DetectionMethod::MarkupFlattened => "markup-flattened",
            DetectionMethod::DisplayDelimiter => "display-delimiter",
            DetectionMethod::InlineDelimiter => "inline-delimiter",
            DetectionMethod::ControlSequence => "control-sequence",
            DetectionMethod::FontHint => "font-hint",
            DetectionMethod::SymbolRun => "symbol-run",
            DetectionMethod::Assignment => "assignment",
        };
        f.write_str(name)
    }
}

/// Origin of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationSource {
    /// Byte range `start..end` within normalized line `line`
    Text {
        /// Line index
        line: usize,
        /// Byte offset of the raw hit
        start: usize,
        /// Byte offset past the raw hit
        end: usize,
    },
    /// N-th math markup fragment
    Fragment {
        /// Fragment index
        index: usize,
    },
    /// N-th math-font span in the HTML rendering
    Html {
        /// Span index
        index: usize,
    },
}

impl EquationSource {
    /// Ordering key: text positions first, then fragments, then HTML spans.
    pub fn position_key(&self) -> (usize, usize, usize) {
        match *self {
            EquationSource::Text { line, start, .. } => (0, line, start),
            EquationSource::Fragment { index } => (1, index, 0),
            EquationSource::Html { index } => (2, index, 0),
        }
    }
}

/// A sentence announcing an equation ("the following equation…").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTrigger {
    /// Line index of the sentence
    pub line: usize,
    /// Matched trigger phrase
    pub phrase: String,
}
