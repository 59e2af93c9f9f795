//! Rendering options and configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

use super::layout::AbbreviationDictionary;
use super::template::{TemplateKind, TemplateProfile};

/// Options for LaTeX serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Target venue template
    pub template: TemplateKind,

    /// Shorten and wrap cells of dense tables
    pub abbreviate: bool,

    /// Close the document with a bibliography stub when no references section was found
    pub bibliography_stub: bool,

    /// Replacement for the template's abbreviation dictionary
    pub abbreviations: Option<AbbreviationDictionary>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the target template.
    pub fn with_template(mut self, template: TemplateKind) -> Self {
        self.template = template;
        self
    }

    /// Enable or disable table abbreviation.
    pub fn with_abbreviation(mut self, abbreviate: bool) -> Self {
        self.abbreviate = abbreviate;
        self
    }

    /// Enable or disable the bibliography stub.
    pub fn with_bibliography_stub(mut self, stub: bool) -> Self {
        self.bibliography_stub = stub;
        self
    }

    /// Replace the abbreviation dictionary.
    pub fn with_abbreviations(mut self, abbreviations: AbbreviationDictionary) -> Self {
        self.abbreviations = Some(abbreviations);
        self
    }

    /// Template profile with any dictionary override applied.
    pub fn profile(&self) -> TemplateProfile {
        let profile = TemplateProfile::from_kind(self.template);
        match &self.abbreviations {
            Some(dict) => profile.with_abbreviations(dict.clone()),
            None => profile,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            template: TemplateKind::Ieee,
            abbreviate: true,
            bibliography_stub: true,
            abbreviations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_template(TemplateKind::Acm)
            .with_abbreviation(false)
            .with_bibliography_stub(false);

        assert_eq!(options.template, TemplateKind::Acm);
        assert!(!options.abbreviate);
        assert!(!options.bibliography_stub);
        assert_eq!(options.profile().kind, TemplateKind::Acm);
    }

    #[test]
    fn test_from_json_partial() {
        let options =
            RenderOptions::from_json(r#"{"template": "springer", "abbreviations": {"Speed": "Spd."}}"#)
                .unwrap();
        assert_eq!(options.template, TemplateKind::Springer);
        assert!(options.abbreviate);
        assert_eq!(options.profile().abbreviations.len(), 1);
    }

    #[test]
    fn test_from_json_unknown_template() {
        assert!(RenderOptions::from_json(r#"{"template": "nature"}"#).is_err());
    }
}
