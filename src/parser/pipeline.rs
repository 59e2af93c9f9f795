//! The structure extraction pipeline.

use crate::convert::SourceBundle;
use crate::model::DocumentModel;

use super::classifier::{ClassificationContext, LineClassifier};
use super::equation::EquationExtractor;
use super::front_matter::FrontMatterDetector;
use super::html::HtmlSource;
use super::normalize::LineNormalizer;
use super::options::ParseOptions;
use super::patterns::StructurePatterns;
use super::segmenter::SectionSegmenter;
use super::table_extractor::TableExtractor;

/// Recovers a [`DocumentModel`] from a manuscript.
///
/// Stages run in a fixed order: normalization, table extraction, equation
/// extraction, line classification, front matter, section segmentation.
/// Structural absence is never an error; the model records what was found.
///
/// # Example
///
/// ```
/// use papertex::parser::ManuscriptParser;
///
/// let parser = ManuscriptParser::new();
/// let doc = parser.parse_text("Paper Title\nJ. Doe\n1. Introduction\nSome text.");
/// assert_eq!(doc.title.text, "Paper Title");
/// assert_eq!(doc.sections.len(), 1);
/// ```
pub struct ManuscriptParser {
    options: ParseOptions,
    patterns: StructurePatterns,
    normalizer: LineNormalizer,
    tables: TableExtractor,
    equations: EquationExtractor,
}

impl ManuscriptParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            patterns: StructurePatterns::new(),
            normalizer: LineNormalizer::new(options.normalize_unicode),
            tables: TableExtractor::with_options(options.tables.clone()),
            equations: EquationExtractor::with_options(options.equations.clone()),
            options,
        }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse plain text with no HTML rendering and no math fragments.
    pub fn parse_text(&self, text: &str) -> DocumentModel {
        self.parse(&SourceBundle::new(text))
    }

    /// Parse a source bundle.
    pub fn parse(&self, bundle: &SourceBundle) -> DocumentModel {
        let html = bundle.html.as_deref().map(HtmlSource::parse);

        let lines = if bundle.raw_text.trim().is_empty() {
            match &html {
                Some(html) => self.normalizer.normalize(&html.text_lines().join("\n")),
                None => Vec::new(),
            }
        } else {
            self.normalizer.normalize(&bundle.raw_text)
        };
        log::info!("ManuscriptParser: {} non-empty lines", lines.len());

        let tables = self.tables.extract(&lines, html.as_ref());
        let table_spans = tables.line_spans();

        let equations =
            self.equations
                .extract(&lines, &bundle.math_fragments, html.as_ref(), &table_spans);

        let classified = LineClassifier::new(&self.patterns).classify(
            &lines,
            ClassificationContext {
                exclusions: &tables.exclusions,
                table_spans: &table_spans,
                equation_lines: &equations.equation_lines,
            },
        );

        let front = FrontMatterDetector::new(self.options.front_matter.clone(), &self.patterns)
            .detect(&classified);

        let sections = SectionSegmenter::new(&self.patterns, self.options.fallback_min_chars)
            .segment(
                &classified,
                &front.consumed,
                &tables.tables,
                &equations.equations,
            );

        let doc = DocumentModel {
            title: front.title,
            authors: front.authors,
            affiliations: front.affiliations,
            abstract_text: front.abstract_text,
            keywords: front.keywords,
            sections,
            tables: tables.tables,
            equations: equations.equations,
        };

        let dangling = doc.dangling_placeholders();
        if !dangling.is_empty() {
            log::warn!(
                "ManuscriptParser: {} placeholders do not resolve and will render literally",
                dangling.len()
            );
        }
        log::info!(
            "ManuscriptParser: {} sections, {} tables, {} equations",
            doc.sections.len(),
            doc.tables.len(),
            doc.equations.len()
        );
        doc
    }
}

impl Default for ManuscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let doc = ManuscriptParser::new().parse_text("");
        assert!(doc.is_empty());
        assert!(!doc.title.is_detected());
    }

    #[test]
    fn test_html_only_bundle() {
        let bundle = SourceBundle::new(String::new())
            .with_html("<h1>Deep Learning for Tables</h1><p>1. Introduction</p><p>Body text.</p>");
        let doc = ManuscriptParser::new().parse(&bundle);

        assert_eq!(doc.title.text, "Deep Learning for Tables");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Introduction");
    }

    #[test]
    fn test_table_cells_never_open_sections() {
        let text = "Title of Paper\n||====||\n||1. Setup|2. Result||\n||====||\n1. Real Section\nBody.";
        let doc = ManuscriptParser::new().parse_text(text);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Real Section");
    }
}
