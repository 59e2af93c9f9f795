//! Serialization of the document model to LaTeX and JSON.
//!
//! Only this stage varies per venue: the same [`crate::model::DocumentModel`]
//! can be rendered against every [`TemplateProfile`] without re-parsing.

mod json;
mod latex;
mod layout;
mod options;
mod result;
mod template;

pub use json::{
    summarize, to_json, to_summary_json, DocumentSummary, EquationSummary, JsonFormat,
    OutlineEntry, TableSummary,
};
pub use latex::{
    escape_latex, to_latex, to_latex_with_stats, LatexRenderer, DEFAULT_AUTHOR, DEFAULT_TITLE,
};
pub use layout::{
    optimize_table, wrap, Abbreviation, AbbreviationDictionary, AbbreviationLevel, Abbreviator,
    ColumnProfile, DensityTier, FontTier, SpacingTier, TableEnvironment, TableLayout,
};
pub use options::RenderOptions;
pub use result::{RenderResult, SerializationStats};
pub use template::{
    AuthorBlockStyle, BorderStyle, ColumnLayout, KeywordStyle, LayoutBounds, TemplateKind,
    TemplateProfile,
};
