//! # papertex
//!
//! Recover the logical structure of academic manuscripts and typeset it
//! for IEEE, ACM and Springer LaTeX templates.
//!
//! A manuscript arrives as plain text, optionally with an HTML rendering and
//! math markup fragments. The parser recovers title, authors, abstract,
//! keywords, sections, tables and equations into a [`DocumentModel`]; the
//! renderer serializes that model against a template profile.
//!
//! ## Quick Start
//!
//! ```
//! use papertex::{parse_text, render};
//!
//! let doc = parse_text("Paper Title\nJ. Doe\nAbstract: We study X.\n1. Introduction\nSome text.");
//! assert_eq!(doc.title.text, "Paper Title");
//!
//! let latex = render::to_latex(&doc, &render::RenderOptions::default()).unwrap();
//! assert!(latex.contains("\\section{Introduction}"));
//! ```
//!
//! ## Features
//!
//! - **Front matter**: title, authors, affiliations, abstract, keywords with confidence and reasoning
//! - **Sections**: arabic, sub-numbered and roman headings
//! - **Tables**: `||====||` fenced grids and HTML tables with caption resolution
//! - **Equations**: OMML/MathML fragments, delimiters, math fonts, symbol runs
//! - **Adaptive layout**: column widths, font size and abbreviation by content density
//! - **Templates**: IEEE, ACM and Springer from one document model

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{AdapterRegistry, HtmlAdapter, InputAdapter, SourceBundle, TextAdapter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, InputFormat};
pub use error::{Error, Result};
pub use model::{
    ContentUnit, DetectedElement, DocumentModel, Equation, Line, LineFlags, Section, SectionKind,
    Table,
};
pub use parser::{ManuscriptParser, ParseOptions};
pub use render::{JsonFormat, RenderOptions, TemplateKind, TemplateProfile};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parse plain manuscript text.
///
/// # Example
///
/// ```
/// use papertex::parse_text;
///
/// let doc = parse_text("2. Approach\nText.\n2.1 Method\nMore text.");
/// assert_eq!(doc.sections[1].level, 2);
/// ```
pub fn parse_text(text: &str) -> DocumentModel {
    ManuscriptParser::new().parse_text(text)
}

/// Parse a source bundle (text, HTML rendering and math fragments).
pub fn parse_bundle(bundle: &SourceBundle) -> DocumentModel {
    ManuscriptParser::new().parse(bundle)
}

/// Load and parse a manuscript file.
///
/// # Example
///
/// ```no_run
/// use papertex::parse_file;
///
/// let doc = parse_file("paper.txt").unwrap();
/// println!("Sections: {}", doc.sections.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentModel> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Load and parse a manuscript file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<DocumentModel> {
    let bundle = convert::load(path, None)?;
    Ok(ManuscriptParser::with_options(options).parse(&bundle))
}

/// Parse manuscript bytes after sniffing their format.
pub fn parse_bytes(data: &[u8]) -> Result<DocumentModel> {
    let bundle = AdapterRegistry::with_defaults().load_sniffed(data)?;
    Ok(parse_bundle(&bundle))
}

/// Convert a manuscript file to LaTeX for a template.
///
/// # Example
///
/// ```no_run
/// use papertex::{to_latex, TemplateKind};
///
/// let latex = to_latex("paper.txt", TemplateKind::Acm).unwrap();
/// std::fs::write("paper.tex", latex).unwrap();
/// ```
pub fn to_latex<P: AsRef<Path>>(path: P, template: TemplateKind) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_latex(&doc, &RenderOptions::new().with_template(template))
}

/// Convert a manuscript file to the JSON document model.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Parse and render options loaded together from one JSON file.
///
/// ```
/// use papertex::Config;
///
/// let config = Config::from_json(r#"{"render": {"template": "acm"}}"#).unwrap();
/// assert_eq!(config.render.template, papertex::TemplateKind::Acm);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Structure extraction options
    pub parse: ParseOptions,
    /// Serialization options
    pub render: RenderOptions,
}

impl Config {
    /// Load configuration from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Builder for parsing and converting manuscripts.
///
/// # Example
///
/// ```no_run
/// use papertex::{Papertex, TemplateKind};
///
/// let latex = Papertex::new()
///     .with_template(TemplateKind::Springer)
///     .with_math_dir("./math")
///     .parse("paper.html")?
///     .to_latex()?;
/// # Ok::<(), papertex::Error>(())
/// ```
pub struct Papertex {
    parse_options: ParseOptions,
    render_options: RenderOptions,
    math_dir: Option<PathBuf>,
}

impl Papertex {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
            math_dir: None,
        }
    }

    /// Use parse and render options from a configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.parse_options = config.parse;
        self.render_options = config.render;
        self
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Set the target template.
    pub fn with_template(mut self, template: TemplateKind) -> Self {
        self.render_options = self.render_options.with_template(template);
        self
    }

    /// Enable or disable table abbreviation.
    pub fn with_abbreviation(mut self, abbreviate: bool) -> Self {
        self.render_options = self.render_options.with_abbreviation(abbreviate);
        self
    }

    /// Load math markup fragments from a directory of `*.xml` files.
    pub fn with_math_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.math_dir = Some(dir.into());
        self
    }

    /// Load and parse a manuscript file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<PapertexResult> {
        let bundle = convert::load(path, self.math_dir.as_deref())?;
        Ok(self.parse_bundle(&bundle))
    }

    /// Parse plain text.
    pub fn parse_text(self, text: &str) -> PapertexResult {
        self.parse_bundle(&SourceBundle::new(text))
    }

    /// Parse a source bundle.
    pub fn parse_bundle(self, bundle: &SourceBundle) -> PapertexResult {
        let document = ManuscriptParser::with_options(self.parse_options).parse(bundle);
        PapertexResult {
            document,
            render_options: self.render_options,
        }
    }
}

impl Default for Papertex {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a manuscript.
pub struct PapertexResult {
    /// The recovered document model
    pub document: DocumentModel,
    /// Render options to use
    render_options: RenderOptions,
}

impl PapertexResult {
    /// Convert to LaTeX with the configured template.
    pub fn to_latex(&self) -> Result<String> {
        render::to_latex(&self.document, &self.render_options)
    }

    /// Convert to LaTeX for another template without re-parsing.
    pub fn to_latex_for(&self, template: TemplateKind) -> Result<String> {
        let options = self.render_options.clone().with_template(template);
        render::to_latex(&self.document, &options)
    }

    /// Convert to LaTeX with serialization statistics.
    pub fn to_latex_with_stats(&self) -> Result<render::RenderResult> {
        render::to_latex_with_stats(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Summary of the recovered structure.
    pub fn summary(&self) -> render::DocumentSummary {
        render::summarize(&self.document)
    }

    /// Get plain text of the recovered structure.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document model.
    pub fn document(&self) -> &DocumentModel {
        &self.document
    }
}
