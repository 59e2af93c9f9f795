//! Venue template profiles.
//!
//! A profile is static configuration: it is selected by name at
//! serialization time and never mutated by the pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::layout::AbbreviationDictionary;

/// Built-in venue templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// IEEE conference (`IEEEtran`)
    #[default]
    Ieee,
    /// ACM SIG proceedings (`acmart`, `sigconf`)
    Acm,
    /// Springer Lecture Notes (`llncs`)
    Springer,
}

impl TemplateKind {
    /// All built-in templates.
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Ieee, TemplateKind::Acm, TemplateKind::Springer];

    /// Lowercase template name.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Ieee => "ieee",
            TemplateKind::Acm => "acm",
            TemplateKind::Springer => "springer",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ieee" | "ieeetran" => Ok(TemplateKind::Ieee),
            "acm" | "acmart" => Ok(TemplateKind::Acm),
            "springer" | "llncs" | "lncs" => Ok(TemplateKind::Springer),
            _ => Err(Error::UnknownTemplate(s.to_string())),
        }
    }
}

/// Page column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnLayout {
    /// One text column
    Single,
    /// Two text columns; wide tables may span both
    Double,
}

/// How table borders are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// `booktabs` rules, no vertical lines
    Rules,
    /// `\hline` and vertical column lines
    Lines,
}

/// How authors and affiliations are typeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorBlockStyle {
    /// One block holding all names followed by all affiliations
    Combined,
    /// One `\author` command per author, each with its own affiliation
    PerAuthor,
    /// Names joined with `\and`, affiliations in `\institute`
    Institute,
}

/// Where the keyword block goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStyle {
    /// `IEEEkeywords` environment after the abstract
    Environment,
    /// `\keywords{}` before `\maketitle`
    PreambleCommand,
    /// `\keywords{}` at the end of the abstract
    AbstractCommand,
}

/// Width bounds for table columns, as fractions of the line width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBounds {
    /// Total width budget for all columns
    pub total: f32,
    /// Narrowest column
    pub min_column: f32,
    /// Widest column
    pub max_column: f32,
}

/// Formatting rules for one publication venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProfile {
    /// Template kind
    pub kind: TemplateKind,
    /// Human-readable venue name
    pub display_name: String,
    /// `\documentclass` line
    pub document_class: String,
    /// Packages loaded after the document class
    pub packages: Vec<String>,
    /// Text column layout
    pub columns: ColumnLayout,
    /// Table border style
    pub borders: BorderStyle,
    /// Author block style
    pub author_block: AuthorBlockStyle,
    /// Keyword block style
    pub keyword_block: KeywordStyle,
    /// Whether the abstract must precede `\maketitle`
    pub abstract_before_maketitle: bool,
    /// `\bibliographystyle` argument
    pub bibliography_style: String,
    /// Table column width bounds
    pub bounds: LayoutBounds,
    /// Phrases shortened when tables are abbreviated
    pub abbreviations: AbbreviationDictionary,
}

impl TemplateProfile {
    /// IEEE conference profile.
    pub fn ieee() -> Self {
        Self {
            kind: TemplateKind::Ieee,
            display_name: "IEEE Conference".into(),
            document_class: r"\documentclass[conference]{IEEEtran}".into(),
            packages: packages(&[
                "cite", "amsmath", "amssymb", "amsfonts", "graphicx", "textcomp", "xcolor",
                "array",
            ]),
            columns: ColumnLayout::Double,
            borders: BorderStyle::Lines,
            author_block: AuthorBlockStyle::Combined,
            keyword_block: KeywordStyle::Environment,
            abstract_before_maketitle: false,
            bibliography_style: "IEEEtran".into(),
            bounds: LayoutBounds {
                total: 0.95,
                min_column: 0.08,
                max_column: 0.45,
            },
            abbreviations: AbbreviationDictionary::default(),
        }
    }

    /// ACM SIG proceedings profile.
    pub fn acm() -> Self {
        Self {
            kind: TemplateKind::Acm,
            display_name: "ACM SIG Proceedings".into(),
            document_class: r"\documentclass[sigconf]{acmart}".into(),
            packages: packages(&["amsmath", "booktabs", "array"]),
            columns: ColumnLayout::Double,
            borders: BorderStyle::Rules,
            author_block: AuthorBlockStyle::PerAuthor,
            keyword_block: KeywordStyle::PreambleCommand,
            abstract_before_maketitle: true,
            bibliography_style: "ACM-Reference-Format".into(),
            bounds: LayoutBounds {
                total: 0.95,
                min_column: 0.08,
                max_column: 0.5,
            },
            abbreviations: AbbreviationDictionary::default(),
        }
    }

    /// Springer Lecture Notes profile.
    pub fn springer() -> Self {
        Self {
            kind: TemplateKind::Springer,
            display_name: "Springer LNCS".into(),
            document_class: r"\documentclass[runningheads]{llncs}".into(),
            packages: packages(&["amsmath", "amssymb", "graphicx", "array"]),
            columns: ColumnLayout::Single,
            borders: BorderStyle::Lines,
            author_block: AuthorBlockStyle::Institute,
            keyword_block: KeywordStyle::AbstractCommand,
            abstract_before_maketitle: false,
            bibliography_style: "splncs04".into(),
            bounds: LayoutBounds {
                total: 0.9,
                min_column: 0.1,
                max_column: 0.6,
            },
            abbreviations: AbbreviationDictionary::default(),
        }
    }

    /// Profile for a template kind.
    pub fn from_kind(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Ieee => Self::ieee(),
            TemplateKind::Acm => Self::acm(),
            TemplateKind::Springer => Self::springer(),
        }
    }

    /// Profile by name (`ieee`, `acm`, `springer`).
    pub fn by_name(name: &str) -> Result<Self> {
        Ok(Self::from_kind(name.parse()?))
    }

    /// All built-in profiles.
    pub fn all() -> Vec<Self> {
        TemplateKind::ALL.iter().map(|k| Self::from_kind(*k)).collect()
    }

    /// Replace the abbreviation dictionary.
    pub fn with_abbreviations(mut self, abbreviations: AbbreviationDictionary) -> Self {
        self.abbreviations = abbreviations;
        self
    }

    /// Whether wide tables may span both columns.
    pub fn is_double_column(&self) -> bool {
        self.columns == ColumnLayout::Double
    }
}

fn packages(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(TemplateProfile::by_name("IEEE").unwrap().kind, TemplateKind::Ieee);
        assert_eq!(TemplateProfile::by_name("acm").unwrap().kind, TemplateKind::Acm);
        assert_eq!(TemplateProfile::by_name("llncs").unwrap().kind, TemplateKind::Springer);

        let err = TemplateProfile::by_name("nature").unwrap_err();
        assert!(matches!(err, Error::UnknownTemplate(name) if name == "nature"));
    }

    #[test]
    fn test_profiles_differ() {
        let ieee = TemplateProfile::ieee();
        let acm = TemplateProfile::acm();
        let springer = TemplateProfile::springer();

        assert!(ieee.is_double_column());
        assert!(!springer.is_double_column());
        assert_eq!(acm.borders, BorderStyle::Rules);
        assert!(acm.packages.iter().any(|p| p == "booktabs"));
        assert_ne!(ieee.document_class, springer.document_class);
    }

    #[test]
    fn test_bounds_are_consistent() {
        for profile in TemplateProfile::all() {
            let b = profile.bounds;
            assert!(b.min_column < b.max_column);
            assert!(b.max_column <= b.total);
            assert!(b.total <= 1.0);
        }
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&TemplateKind::Springer).unwrap();
        assert_eq!(json, "\"springer\"");
        let kind: TemplateKind = serde_json::from_str("\"acm\"").unwrap();
        assert_eq!(kind, TemplateKind::Acm);
    }
}
