//! Table types.

use super::LineSpan;
use serde::{Deserialize, Serialize};

/// A table recovered from the manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 1-indexed id, referenced by `[TABLE_<id>]`
    pub id: usize,

    /// Rows of cell text
    pub grid: Vec<Vec<String>>,

    /// Resolved caption
    pub caption: String,

    /// Where the caption came from
    pub caption_source: CaptionSource,

    /// LaTeX label (`tab:<id>`)
    pub label: String,

    /// Whether the first row is a header row
    pub has_header_row: bool,

    /// Where the table was found
    pub source: TableSource,
}

impl Table {
    /// Create a table with the given id and grid.
    pub fn new(id: usize, grid: Vec<Vec<String>>, source: TableSource) -> Self {
        Self {
            id,
            grid,
            caption: format!("Table {}", id),
            caption_source: CaptionSource::Synthesized,
            label: format!("tab:{}", id),
            has_header_row: false,
            source,
        }
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: impl Into<String>, source: CaptionSource) -> Self {
        self.caption = caption.into();
        self.caption_source = source;
        self
    }

    /// Mark the first row as header and return self.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header_row = has_header;
        self
    }

    /// Placeholder token for this table.
    pub fn placeholder(&self) -> String {
        format!("[TABLE_{}]", self.id)
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.grid.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Get header rows.
    pub fn header(&self) -> &[Vec<String>] {
        if self.has_header_row && !self.grid.is_empty() {
            &self.grid[..1]
        } else {
            &[]
        }
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[Vec<String>] {
        let skip = self.header().len();
        &self.grid[skip..]
    }

    /// Line span of the table in the normalized text, if known.
    pub fn line_span(&self) -> Option<LineSpan> {
        self.source.line_span()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Origin of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// `||====||` fenced region in the text
    Fenced(LineSpan),
    /// `<table>` element in the HTML rendering
    Markup {
        /// Document-order index of the table element
        node: usize,
        /// Lines of the plain text that repeat the table's cells
        lines: Option<LineSpan>,
    },
}

impl TableSource {
    /// Line span of the source, if known.
    pub fn line_span(&self) -> Option<LineSpan> {
        match self {
            TableSource::Fenced(span) => Some(*span),
            TableSource::Markup { lines, .. } => *lines,
        }
    }
}

/// Where a table caption was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionSource {
    /// A non-row line inside the fence, or a `<caption>` element
    Internal,
    /// The line right before the table
    Preceding,
    /// The line right after the table
    Following,
    /// Default `"Table <n>"`
    Synthesized,
}
