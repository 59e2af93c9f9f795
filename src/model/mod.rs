//! Document model types for recovered manuscript structure.
//!
//! This module defines the intermediate representation that bridges
//! structure extraction and template serialization. Every type is created
//! once during a parse pass and treated as read-only afterwards.

mod document;
mod element;
mod equation;
mod line;
mod section;
mod table;

pub use document::{scan_placeholders, DocumentModel, PlaceholderRef};
pub use element::DetectedElement;
pub use equation::{ContextTrigger, DetectionMethod, Equation, EquationSource};
pub use line::{Line, LineFlags, LineSpan};
pub use section::{ContentUnit, Section, SectionKind};
pub use table::{CaptionSource, Table, TableSource};
