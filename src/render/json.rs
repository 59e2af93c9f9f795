//! JSON export of the document model.
//!
//! Two views are available: the full model (round-trips through serde) and
//! a summary with the recovered outline, table shapes and equation methods.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DetectedElement, DetectionMethod, DocumentModel};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Condensed view of a recovered manuscript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub affiliations: Vec<String>,
    pub keywords: Vec<String>,
    pub has_abstract: bool,
    pub outline: Vec<OutlineEntry>,
    pub tables: Vec<TableSummary>,
    pub equations: Vec<EquationSummary>,
    /// Placeholders in the body with no matching table or equation
    pub dangling: Vec<String>,
}

/// One section heading with the items placed in its body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntry {
    pub number: String,
    pub title: String,
    pub level: u8,
    pub tables: Vec<usize>,
    pub equations: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub id: usize,
    pub caption: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquationSummary {
    pub id: usize,
    pub method: DetectionMethod,
    pub confidence: f32,
    pub latex: String,
}

/// Build the summary view of a document.
pub fn summarize(doc: &DocumentModel) -> DocumentSummary {
    let detected = |element: &DetectedElement| element.is_detected().then(|| element.text.clone());

    DocumentSummary {
        title: detected(&doc.title),
        authors: detected(&doc.authors),
        affiliations: doc.affiliations.clone(),
        keywords: doc
            .keywords
            .text
            .split([',', ';'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        has_abstract: doc.abstract_text.is_detected(),
        outline: doc
            .sections
            .iter()
            .map(|s| OutlineEntry {
                number: s.number.clone(),
                title: s.title.clone(),
                level: s.level,
                tables: s.table_refs().collect(),
                equations: s.equation_refs().collect(),
            })
            .collect(),
        tables: doc
            .tables
            .iter()
            .map(|t| TableSummary {
                id: t.id,
                caption: t.caption.clone(),
                rows: t.row_count(),
                columns: t.column_count(),
            })
            .collect(),
        equations: doc
            .equations
            .iter()
            .map(|e| EquationSummary {
                id: e.id,
                method: e.method,
                confidence: e.confidence,
                latex: e.canonical_form.clone(),
            })
            .collect(),
        dangling: doc
            .dangling_placeholders()
            .iter()
            .map(|p| p.to_string())
            .collect(),
    }
}

/// Convert a document model to JSON.
pub fn to_json(doc: &DocumentModel, format: JsonFormat) -> Result<String> {
    write_json(doc, format)
}

/// Convert the summary view of a document model to JSON.
pub fn to_summary_json(doc: &DocumentModel, format: JsonFormat) -> Result<String> {
    write_json(&summarize(doc), format)
}

fn write_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };
    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentUnit, Section, SectionKind, Table, TableSource};

    #[test]
    fn test_to_json_pretty() {
        let mut doc = DocumentModel::new();
        doc.title = DetectedElement::detected("Test", 0.9, "first line", 0);

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("Test"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = DocumentModel::new();
        doc.keywords = DetectedElement::detected("x, y", 0.9, "marker", 3);
        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        let back: DocumentModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keywords.text, "x, y");
    }

    #[test]
    fn test_summary() {
        let mut doc = DocumentModel::new();
        doc.title = DetectedElement::detected("Paper Title", 0.9, "first line", 0);
        doc.keywords = DetectedElement::detected("tables; latex, layout", 0.9, "marker", 2);
        doc.tables.push(Table::new(
            1,
            vec![vec!["A".into(), "B".into()], vec!["1".into(), "2".into()]],
            TableSource::Fenced(crate::model::LineSpan::new(4, 7)),
        ));
        let mut section = Section::new("1.", "Results", 1, SectionKind::Arabic, 3);
        section.body.push(ContentUnit::Table(1));
        section.push_text("See [EQUATION_2].");
        doc.sections.push(section);

        let summary = summarize(&doc);
        assert_eq!(summary.title.as_deref(), Some("Paper Title"));
        assert_eq!(summary.authors, None);
        assert_eq!(summary.keywords, vec!["tables", "latex", "layout"]);
        assert!(!summary.has_abstract);
        assert_eq!(summary.outline[0].tables, vec![1]);
        assert_eq!(summary.tables[0].rows, 2);
        assert_eq!(summary.tables[0].columns, 2);
        assert_eq!(summary.dangling, vec!["[EQUATION_2]"]);

        let json = to_summary_json(&doc, JsonFormat::Compact).unwrap();
        assert!(json.contains("\"outline\":[{\"number\":\"1.\",\"title\":\"Results\""));
    }
}
