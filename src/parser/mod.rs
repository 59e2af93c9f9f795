//! Manuscript structure extraction.

mod classifier;
mod equation;
mod front_matter;
mod html;
mod normalize;
mod options;
mod patterns;
mod pipeline;
mod segmenter;
mod table_extractor;

pub use classifier::{ClassificationContext, LineClassifier};
pub use equation::{
    canonicalize, Candidate, EquationExtraction, EquationExtractor, MarkupConverter,
    TextDetectors,
};
pub use front_matter::{FrontMatter, FrontMatterDetector};
pub use html::{HtmlSource, HtmlTable};
pub use normalize::LineNormalizer;
pub use options::{EquationOptions, FrontMatterOptions, ParseOptions, TableOptions};
pub use patterns::{Heading, StructurePatterns};
pub use pipeline::ManuscriptParser;
pub use segmenter::{SectionSegmenter, FALLBACK_SECTION_TITLE};
pub use table_extractor::{
    parse_row, ExclusionSet, TableExtraction, TableExtractor, TABLE_FENCE,
};
