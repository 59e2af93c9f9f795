//! Section types.

use super::LineSpan;
use serde::{Deserialize, Serialize};

/// A section of the manuscript body.
///
/// Sections form a flat ordered list; a section of level `n` is subordinate
/// to the nearest preceding section with a lower level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Numbering as written ("1.", "2.1", "IV."), empty when unnumbered
    pub number: String,

    /// Heading text without the numbering
    pub title: String,

    /// Nesting depth (always ≥ 1)
    pub level: u8,

    /// Ordered body content
    pub body: Vec<ContentUnit>,

    /// Numbering style of the heading
    pub kind: SectionKind,

    /// Heuristic score in `[0, 1]`
    pub confidence: f32,

    /// Lines covered, heading included
    pub span: LineSpan,
}

impl Section {
    /// Create an empty section.
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        level: u8,
        kind: SectionKind,
        heading_line: usize,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            level: level.max(1),
            body: Vec::new(),
            kind,
            confidence: kind.base_confidence(),
            span: LineSpan::single(heading_line),
        }
    }

    /// Append a text unit, merging nothing.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.body.push(ContentUnit::Text(text));
        }
    }

    /// Whether this section is a references/bibliography section.
    pub fn is_references(&self) -> bool {
        let title = self
            .title
            .trim()
            .trim_end_matches(|c: char| c == ':' || c == '.')
            .to_lowercase();
        matches!(title.as_str(), "references" | "bibliography" | "reference")
    }

    /// Body with placeholders rendered as tokens, one unit per line.
    pub fn body_text(&self) -> String {
        let mut out = String::new();
        for unit in &self.body {
            match unit {
                ContentUnit::Text(text) => {
                    if !out.is_empty() && !out.ends_with(' ') && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                other => {
                    if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(&other.token());
                }
            }
        }
        out
    }

    /// Plain text of the body without placeholders.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .filter_map(|u| match u {
                ContentUnit::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ids of tables referenced in the body.
    pub fn table_refs(&self) -> impl Iterator<Item = usize> + '_ {
        self.body.iter().filter_map(|u| match u {
            ContentUnit::Table(id) => Some(*id),
            _ => None,
        })
    }

    /// Ids of equations referenced in the body.
    pub fn equation_refs(&self) -> impl Iterator<Item = usize> + '_ {
        self.body.iter().filter_map(|u| match u {
            ContentUnit::Equation(id) => Some(*id),
            _ => None,
        })
    }
}

/// Numbering style of a section heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// "1.", "2.1", "3.2.1"
    Arabic,
    /// "I.", "IV"
    Roman,
    /// Synthetic fallback section or bare "References"
    Unnumbered,
}

impl SectionKind {
    /// Base confidence for a heading of this style.
    pub fn base_confidence(&self) -> f32 {
        match self {
            SectionKind::Arabic => 0.9,
            SectionKind::Roman => 0.85,
            SectionKind::Unnumbered => 0.5,
        }
    }
}

/// One ordered unit of section body content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum ContentUnit {
    /// A span of prose
    Text(String),
    /// Reference to a table id
    Table(usize),
    /// Reference to an equation id
    Equation(usize),
}

impl ContentUnit {
    /// Placeholder token form of the unit (prose is returned as is).
    pub fn token(&self) -> String {
        match self {
            ContentUnit::Text(text) => text.clone(),
            ContentUnit::Table(id) => format!("[TABLE_{}]", id),
            ContentUnit::Equation(id) => format!("[EQUATION_{}]", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_is_at_least_one() {
        let section = Section::new("", "Content", 0, SectionKind::Unnumbered, 0);
        assert_eq!(section.level, 1);
    }

    #[test]
    fn test_body_text_with_placeholders() {
        let mut section = Section::new("1.", "Results", 1, SectionKind::Arabic, 4);
        section.push_text("See below.");
        section.body.push(ContentUnit::Table(1));
        section.push_text("   ");
        section.body.push(ContentUnit::Equation(2));

        assert_eq!(section.body.len(), 3);
        assert_eq!(section.body_text(), "See below. [TABLE_1] [EQUATION_2]");
        assert_eq!(section.table_refs().collect::<Vec<_>>(), vec![1]);
        assert_eq!(section.equation_refs().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_is_references() {
        let section = Section::new("6.", "References", 1, SectionKind::Arabic, 10);
        assert!(section.is_references());
        let section = Section::new("6.", "Related Work", 1, SectionKind::Arabic, 10);
        assert!(!section.is_references());
    }
}
