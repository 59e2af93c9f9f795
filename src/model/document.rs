//! Document-level types.

use super::{ContentUnit, DetectedElement, Equation, Section, Table};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The recovered logical structure of one manuscript.
///
/// Created once per parse and read-only afterwards; it can be serialized
/// against any number of template profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Paper title
    pub title: DetectedElement,

    /// Author line
    pub authors: DetectedElement,

    /// Affiliation lines found between title and abstract
    pub affiliations: Vec<String>,

    /// Abstract text (paragraphs separated by blank lines)
    pub abstract_text: DetectedElement,

    /// Keyword string with the marker removed
    pub keywords: DetectedElement,

    /// Sections in document order
    pub sections: Vec<Section>,

    /// Tables in discovery order
    pub tables: Vec<Table>,

    /// Equations ordered by confidence, then source position
    pub equations: Vec<Equation>,
}

impl DocumentModel {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a table by id.
    pub fn table(&self, id: usize) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Get an equation by id.
    pub fn equation(&self, id: usize) -> Option<&Equation> {
        self.equations.iter().find(|e| e.id == id)
    }

    /// Check if a placeholder resolves to an existing table or equation.
    pub fn resolves(&self, placeholder: PlaceholderRef) -> bool {
        match placeholder {
            PlaceholderRef::Table(id) => self.table(id).is_some(),
            PlaceholderRef::Equation(id) => self.equation(id).is_some(),
        }
    }

    /// Placeholders in section bodies that resolve to nothing.
    ///
    /// These indicate detector disagreement; the serializer renders them literally.
    pub fn dangling_placeholders(&self) -> Vec<PlaceholderRef> {
        let mut dangling = Vec::new();
        for section in &self.sections {
            for unit in &section.body {
                match unit {
                    ContentUnit::Table(id) => {
                        if self.table(*id).is_none() {
                            dangling.push(PlaceholderRef::Table(*id));
                        }
                    }
                    ContentUnit::Equation(id) => {
                        if self.equation(*id).is_none() {
                            dangling.push(PlaceholderRef::Equation(*id));
                        }
                    }
                    ContentUnit::Text(text) => {
                        for (_, placeholder) in scan_placeholders(text) {
                            if !self.resolves(placeholder) {
                                dangling.push(placeholder);
                            }
                        }
                    }
                }
            }
        }
        dangling
    }

    /// Whether a references section was detected.
    pub fn has_references_section(&self) -> bool {
        self.sections.iter().any(|s| s.is_references())
    }

    /// Check if nothing at all was recovered.
    pub fn is_empty(&self) -> bool {
        !self.title.is_detected()
            && !self.abstract_text.is_detected()
            && self.sections.is_empty()
            && self.tables.is_empty()
            && self.equations.is_empty()
    }

    /// Get plain text content of the body.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(title) = self.title.as_option() {
            parts.push(title.to_string());
        }
        if let Some(abstract_text) = self.abstract_text.as_option() {
            parts.push(abstract_text.to_string());
        }
        for section in &self.sections {
            let heading = format!("{} {}", section.number, section.title);
            parts.push(heading.trim().to_string());
            let body = section.plain_text();
            if !body.is_empty() {
                parts.push(body);
            }
        }
        parts.join("\n\n")
    }
}

/// A `[TABLE_<n>]` or `[EQUATION_<n>]` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderRef {
    /// `[TABLE_<n>]`
    Table(usize),
    /// `[EQUATION_<n>]`
    Equation(usize),
}

impl std::fmt::Display for PlaceholderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceholderRef::Table(id) => write!(f, "[TABLE_{}]", id),
            PlaceholderRef::Equation(id) => write!(f, "[EQUATION_{}]", id),
        }
    }
}

/// Find placeholder tokens in text, returning their byte ranges.
pub fn scan_placeholders(text: &str) -> Vec<(Range<usize>, PlaceholderRef)> {
    const PREFIXES: [(&str, bool); 2] = [("[TABLE_", true), ("[EQUATION_", false)];

    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(rel) = text[pos..].find('[') {
        let start = pos + rel;
        let rest = &text[start..];
        let mut matched = None;
        for (prefix, is_table) in PREFIXES {
            if let Some(after) = rest.strip_prefix(prefix) {
                let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() || !after[digits.len()..].starts_with(']') {
                    continue;
                }
                if let Ok(id) = digits.parse::<usize>() {
                    let end = start + prefix.len() + digits.len() + 1;
                    let placeholder = if is_table {
                        PlaceholderRef::Table(id)
                    } else {
                        PlaceholderRef::Equation(id)
                    };
                    matched = Some((start..end, placeholder));
                }
            }
        }
        match matched {
            Some((range, placeholder)) => {
                pos = range.end;
                found.push((range, placeholder));
            }
            None => pos = start + 1,
        }
    }
    found
}
