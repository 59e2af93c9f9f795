//! Line classification.
//!
//! Assigns structural hints to each normalized line. Table membership is
//! decided first and suppresses every other structural flag.

use std::collections::HashSet;

use crate::model::{Line, LineFlags, LineSpan, SectionKind};

use super::patterns::StructurePatterns;
use super::table_extractor::ExclusionSet;

/// Table and equation knowledge the classifier needs.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationContext<'a> {
    /// Cell text of every extracted table
    pub exclusions: &'a ExclusionSet,
    /// Line spans occupied by tables
    pub table_spans: &'a [LineSpan],
    /// Lines that carry a display equation
    pub equation_lines: &'a HashSet<usize>,
}

/// Flags lines as headings, markers, table lines or equation lines.
pub struct LineClassifier<'p> {
    patterns: &'p StructurePatterns,
}

impl<'p> LineClassifier<'p> {
    /// Create a classifier over the shared pattern set.
    pub fn new(patterns: &'p StructurePatterns) -> Self {
        Self { patterns }
    }

    /// Classify every line.
    ///
    /// After a references heading, numbered lines that read like citation
    /// entries stay in the bibliography instead of opening sections.
    pub fn classify(&self, lines: &[String], context: ClassificationContext<'_>) -> Vec<Line> {
        let mut in_references = false;
        let mut classified = Vec::with_capacity(lines.len());

        for (index, text) in lines.iter().enumerate() {
            let mut flags = self.flags(index, text, context);
            if flags.references_marker {
                in_references = true;
            } else if in_references && numbered(&flags) {
                let citation = self
                    .patterns
                    .parse_heading(text)
                    .is_some_and(|h| self.patterns.looks_like_citation(&h.title));
                if citation {
                    log::debug!("LineClassifier: line {} kept as a reference entry", index);
                    flags.numbered = false;
                    flags.sub_numbered = false;
                    flags.roman_numeral = false;
                } else {
                    in_references = false;
                }
            }
            classified.push(Line::with_flags(index, text.as_str(), flags));
        }

        log::debug!(
            "LineClassifier: {} lines, {} headings, {} table lines",
            classified.len(),
            classified.iter().filter(|l| l.is_heading()).count(),
            classified.iter().filter(|l| l.flags.in_table).count()
        );
        classified
    }

    /// Compute the flags of a single line.
    pub fn flags(&self, index: usize, text: &str, context: ClassificationContext<'_>) -> LineFlags {
        let in_table = context.table_spans.iter().any(|s| s.contains(index))
            || context.exclusions.contains(text);
        if in_table {
            return LineFlags {
                in_table: true,
                ..Default::default()
            };
        }

        let mut flags = LineFlags {
            in_equation: context.equation_lines.contains(&index),
            ..Default::default()
        };

        if let Some(heading) = self.patterns.parse_heading(text) {
            match heading.kind {
                SectionKind::Roman => flags.roman_numeral = true,
                _ if heading.level > 1 => flags.sub_numbered = true,
                _ => flags.numbered = true,
            }
        } else if self.patterns.is_references_marker(text) {
            flags.references_marker = true;
        } else if self.patterns.is_abstract_marker(text) {
            flags.abstract_marker = true;
        } else if self.patterns.is_keyword_marker(text) {
            flags.keyword_marker = true;
        }

        flags
    }
}

fn numbered(flags: &LineFlags) -> bool {
    flags.numbered || flags.sub_numbered || flags.roman_numeral
}
