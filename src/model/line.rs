//! Classified line types.

use serde::{Deserialize, Serialize};

/// A single non-empty line of the normalized manuscript text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Position in the normalized (blank-stripped, trimmed) line sequence
    pub index: usize,

    /// Trimmed line text
    pub text: String,

    /// Structural hints assigned by the line classifier
    pub flags: LineFlags,
}

impl Line {
    /// Create an unclassified line.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            flags: LineFlags::default(),
        }
    }

    /// Create a line with the given flags.
    pub fn with_flags(index: usize, text: impl Into<String>, flags: LineFlags) -> Self {
        Self {
            index,
            text: text.into(),
            flags,
        }
    }

    /// Whether this line opens a section (arabic, roman or bare references heading).
    pub fn is_heading(&self) -> bool {
        !self.flags.in_table
            && (self.flags.numbered
                || self.flags.sub_numbered
                || self.flags.roman_numeral
                || self.flags.references_marker)
    }

    /// Whether this line carries a front-matter marker.
    pub fn is_marker(&self) -> bool {
        self.flags.abstract_marker || self.flags.keyword_marker
    }

    /// Character count of the line.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the line text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Structural hints for a line.
///
/// A line flagged `in_table` never carries any heading or marker flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFlags {
    /// Top-level arabic heading ("1. Introduction")
    pub numbered: bool,
    /// Nested arabic heading ("2.1 Method")
    pub sub_numbered: bool,
    /// Roman numeral heading ("IV. RESULTS")
    pub roman_numeral: bool,
    /// Starts with "Abstract"
    pub abstract_marker: bool,
    /// Starts with "Keywords" or "Index Terms"
    pub keyword_marker: bool,
    /// Bare "References" / "Bibliography" line
    pub references_marker: bool,
    /// Part of a table region or matches a table cell
    pub in_table: bool,
    /// Carries a display equation
    pub in_equation: bool,
}

impl LineFlags {
    /// Whether no flag is set.
    pub fn is_plain(&self) -> bool {
        *self == LineFlags::default()
    }
}

/// An inclusive range of line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    /// First line index
    pub start: usize,
    /// Last line index (inclusive)
    pub end: usize,
}

impl LineSpan {
    /// Create a new span. `end` is clamped to be at least `start`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// A span covering a single line.
    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    /// Check if a line index falls inside the span.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Spans always cover at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_ignores_table_lines() {
        let flags = LineFlags {
            numbered: true,
            in_table: true,
            ..Default::default()
        };
        let line = Line::with_flags(0, "1. Introduction", flags);
        assert!(!line.is_heading());
    }

    #[test]
    fn test_line_span() {
        let span = LineSpan::new(3, 6);
        assert!(span.contains(3));
        assert!(span.contains(6));
        assert!(!span.contains(7));
        assert_eq!(span.len(), 4);

        let clamped = LineSpan::new(5, 2);
        assert_eq!(clamped.end, 5);
    }
}
