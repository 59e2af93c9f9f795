//! Table extraction from fenced text grids and native HTML tables.
//!
//! Fenced grids use a bit-exact syntax:
//!
//! ```text
//! ||====||
//! Optional caption line
//! ||Header A|Header B||
//! ||1|2||
//! ||====||
//! ```
//!
//! The extractor also builds the exclusion set that keeps table cell text
//! from being read as headings or front matter.

use std::collections::HashSet;

use regex::Regex;

use crate::model::{CaptionSource, LineSpan, Table, TableSource};

use super::html::{HtmlSource, HtmlTable};
use super::options::TableOptions;

/// Line that opens and closes a fenced table region.
pub const TABLE_FENCE: &str = "||====||";
/// Delimiter at both ends of a fenced row.
pub const ROW_DELIMITER: &str = "||";
/// Delimiter between cells of a fenced row.
pub const COLUMN_DELIMITER: char = '|';

/// Longest line considered as an adjacent caption.
const MAX_CAPTION_CHARS: usize = 200;

/// Lower-cased table cell text, kept raw and with punctuation stripped.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    raw: HashSet<String>,
    stripped: HashSet<String>,
}

impl ExclusionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell's text.
    pub fn insert_cell(&mut self, cell: &str) {
        let lower = cell.trim().to_lowercase();
        if lower.is_empty() {
            return;
        }
        let stripped = strip_punctuation(&lower);
        if !stripped.is_empty() {
            self.stripped.insert(stripped);
        }
        self.raw.insert(lower);
    }

    /// Whether a line repeats a table cell.
    pub fn contains(&self, line: &str) -> bool {
        let lower = line.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        self.raw.contains(&lower) || {
            let stripped = strip_punctuation(&lower);
            !stripped.is_empty() && self.stripped.contains(&stripped)
        }
    }

    /// Number of distinct raw cell texts.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Keep letters, digits and single spaces.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result of table extraction.
#[derive(Debug, Clone, Default)]
pub struct TableExtraction {
    /// Accepted tables with ids 1..
    pub tables: Vec<Table>,
    /// Cell text of every accepted table
    pub exclusions: ExclusionSet,
}

impl TableExtraction {
    /// Line spans covered by accepted tables.
    pub fn line_spans(&self) -> Vec<LineSpan> {
        self.tables.iter().filter_map(|t| t.line_span()).collect()
    }
}

/// A table region before caption resolution and filtering.
#[derive(Debug, Clone)]
struct CandidateTable {
    grid: Vec<Vec<String>>,
    internal_caption: Option<String>,
    header_cells: bool,
    source: TableSource,
}

/// Extracts tables from normalized lines and the optional HTML rendering.
pub struct TableExtractor {
    options: TableOptions,
    ordinal: Regex,
    descriptive: Regex,
}

impl TableExtractor {
    /// Create a new table extractor with default configuration.
    pub fn new() -> Self {
        Self::with_options(TableOptions::default())
    }

    /// Create a new table extractor with custom thresholds.
    pub fn with_options(options: TableOptions) -> Self {
        Self {
            options,
            ordinal: Regex::new(r"(?i)\btable\s+(\d+|[ivxlc]+)\b").unwrap(),
            descriptive: Regex::new(
                r"(?i)\b(analysis|comparison|results|summary|overview|statistics|performance|evaluation)\b",
            )
            .unwrap(),
        }
    }

    /// Extract tables from the line sequence and, when given, the HTML rendering.
    pub fn extract(&self, lines: &[String], html: Option<&HtmlSource>) -> TableExtraction {
        let mut candidates = self.scan_fenced(lines);
        let fenced_count = candidates.len();

        if self.options.use_html_tables {
            if let Some(html) = html {
                let occupied: Vec<LineSpan> =
                    candidates.iter().filter_map(|c| c.source.line_span()).collect();
                for html_table in html.tables() {
                    if candidates[..fenced_count]
                        .iter()
                        .any(|c| same_grid(&c.grid, &html_table.rows))
                    {
                        log::debug!(
                            "TableExtractor: HTML table {} duplicates a fenced table",
                            html_table.index
                        );
                        continue;
                    }
                    candidates.push(self.markup_candidate(html_table, lines, &occupied));
                }
            }
        }

        let spans: Vec<LineSpan> = candidates
            .iter()
            .filter_map(|c| c.source.line_span())
            .collect();

        let mut extraction = TableExtraction::default();
        for candidate in candidates {
            let id = extraction.tables.len() + 1;
            if let Some(table) = self.finalize(candidate, id, lines, &spans) {
                for cell in table.grid.iter().flatten() {
                    extraction.exclusions.insert_cell(cell);
                }
                extraction.tables.push(table);
            }
        }

        log::info!(
            "TableExtractor: {} tables accepted ({} fenced candidates)",
            extraction.tables.len(),
            fenced_count
        );
        extraction
    }

    /// Scan for `||====||` regions.
    fn scan_fenced(&self, lines: &[String]) -> Vec<CandidateTable> {
        let mut candidates = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            if lines[i] != TABLE_FENCE {
                i += 1;
                continue;
            }

            let Some(close) = (i + 1..lines.len()).find(|&j| lines[j] == TABLE_FENCE) else {
                log::warn!("TableExtractor: unterminated table fence at line {}", i);
                break;
            };

            let mut grid = Vec::new();
            let mut internal_caption = None;
            for line in &lines[i + 1..close] {
                match parse_row(line) {
                    Some(cells) => grid.push(cells),
                    None => {
                        if internal_caption.is_none() {
                            internal_caption = Some(line.clone());
                        }
                    }
                }
            }

            log::debug!(
                "TableExtractor: fenced region {}..={} with {} rows",
                i,
                close,
                grid.len()
            );
            candidates.push(CandidateTable {
                grid,
                internal_caption,
                header_cells: false,
                source: TableSource::Fenced(LineSpan::new(i, close)),
            });
            i = close + 1;
        }

        candidates
    }

    fn markup_candidate(
        &self,
        table: HtmlTable,
        lines: &[String],
        occupied: &[LineSpan],
    ) -> CandidateTable {
        let located = locate_cells(&table.rows, lines, occupied);
        CandidateTable {
            grid: table.rows,
            internal_caption: table.caption,
            header_cells: table.header_cells,
            source: TableSource::Markup {
                node: table.index,
                lines: located,
            },
        }
    }

    /// Resolve the caption, drop duplicate caption rows, and assign the id.
    fn finalize(
        &self,
        candidate: CandidateTable,
        id: usize,
        lines: &[String],
        spans: &[LineSpan],
    ) -> Option<Table> {
        let (caption, caption_source) =
            self.resolve_caption(&candidate, id, lines, spans);

        let before = candidate.grid.len();
        let grid: Vec<Vec<String>> = candidate
            .grid
            .into_iter()
            .filter(|row| !self.is_caption_row(row, &caption, caption_source))
            .collect();
        if grid.len() < before {
            log::debug!(
                "TableExtractor: removed {} caption rows from table {}",
                before - grid.len(),
                id
            );
        }

        if grid.is_empty() {
            log::debug!("TableExtractor: discarding table without data rows");
            return None;
        }

        let has_header = candidate.header_cells || looks_like_header(&grid);
        Some(
            Table::new(id, grid, candidate.source)
                .with_caption(caption, caption_source)
                .with_header(has_header),
        )
    }

    fn resolve_caption(
        &self,
        candidate: &CandidateTable,
        id: usize,
        lines: &[String],
        spans: &[LineSpan],
    ) -> (String, CaptionSource) {
        if let Some(caption) = &candidate.internal_caption {
            return (caption.clone(), CaptionSource::Internal);
        }

        if let Some(span) = candidate.source.line_span() {
            let free = |idx: usize| !spans.iter().any(|s| s.contains(idx));

            if span.start > 0 && free(span.start - 1) {
                let line = &lines[span.start - 1];
                if self.is_caption_like(line) {
                    return (line.clone(), CaptionSource::Preceding);
                }
            }
            if span.end + 1 < lines.len() && free(span.end + 1) {
                let line = &lines[span.end + 1];
                if self.is_caption_like(line) {
                    return (line.clone(), CaptionSource::Following);
                }
            }
        }

        (format!("Table {}", id), CaptionSource::Synthesized)
    }

    /// Whether a line looks like a table caption.
    pub fn is_caption_like(&self, line: &str) -> bool {
        if line.chars().count() > MAX_CAPTION_CHARS || parse_row(line).is_some() {
            return false;
        }
        self.ordinal.is_match(line) || (line.contains(':') && self.descriptive.is_match(line))
    }

    /// Whether a grid row is the caption captured as data.
    fn is_caption_row(&self, row: &[String], caption: &str, source: CaptionSource) -> bool {
        let joined = row
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            return false;
        }

        if self.ordinal.is_match(&joined) {
            return true;
        }
        // A synthesized caption never appears in the content.
        if source == CaptionSource::Synthesized {
            return false;
        }

        let row_lower = joined.to_lowercase();
        let caption_lower = caption.trim().to_lowercase();

        if token_overlap(&row_lower, &caption_lower) >= self.options.caption_token_overlap {
            return true;
        }

        (strsim::normalized_levenshtein(&row_lower, &caption_lower) as f32)
            >= self.options.caption_similarity
    }

    /// Ordinal table references ("Table 2") in a line.
    pub fn ordinal_references(&self, line: &str) -> Vec<usize> {
        self.ordinal
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse::<usize>().ok())
            .collect()
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a fenced row into cells; `None` for non-row lines.
pub fn parse_row(line: &str) -> Option<Vec<String>> {
    if line == TABLE_FENCE
        || line.len() < 2 * ROW_DELIMITER.len()
        || !line.starts_with(ROW_DELIMITER)
        || !line.ends_with(ROW_DELIMITER)
    {
        return None;
    }
    let inner = &line[ROW_DELIMITER.len()..line.len() - ROW_DELIMITER.len()];
    Some(
        inner
            .split(COLUMN_DELIMITER)
            .map(|cell| cell.trim().to_string())
            .collect(),
    )
}

/// Share of tokens the two strings have in common, relative to the longer one.
fn token_overlap(a: &str, b: &str) -> f32 {
    let tokens = |s: &str| -> HashSet<String> {
        strip_punctuation(s)
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    };
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    shared as f32 / a.len().max(b.len()) as f32
}

fn is_numeric_cell(cell: &str) -> bool {
    let trimmed = cell.trim().trim_end_matches('%').replace(['±', ','], "");
    !trimmed.is_empty() && trimmed.split_whitespace().all(|t| t.parse::<f64>().is_ok())
}

/// A first row without numbers above rows that have some is a header.
fn looks_like_header(grid: &[Vec<String>]) -> bool {
    if grid.len() < 2 {
        return false;
    }
    let first = &grid[0];
    !first.iter().all(|c| c.trim().is_empty()) && !first.iter().any(|c| is_numeric_cell(c))
}

fn same_grid(a: &[Vec<String>], b: &[Vec<String>]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ra, rb)| {
            ra.len() == rb.len()
                && ra
                    .iter()
                    .zip(rb)
                    .all(|(ca, cb)| ca.trim().eq_ignore_ascii_case(cb.trim()))
        })
}

/// Find the run of plain-text lines that repeats an HTML table's cells.
fn locate_cells(
    rows: &[Vec<String>],
    lines: &[String],
    occupied: &[LineSpan],
) -> Option<LineSpan> {
    let mut cells = ExclusionSet::new();
    for cell in rows.iter().flatten() {
        cells.insert_cell(cell);
    }
    for row in rows {
        cells.insert_cell(&row.join(" "));
    }
    if cells.is_empty() {
        return None;
    }

    let hits: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| !occupied.iter().any(|s| s.contains(*i)) && cells.contains(line))
        .map(|(i, _)| i)
        .collect();

    let needed = rows.iter().flatten().count().clamp(1, 2);
    let mut run_start = *hits.first()?;
    let mut prev = run_start;
    let mut count = 1;
    for &hit in hits.iter().skip(1) {
        if hit - prev <= 2 {
            count += 1;
        } else {
            if count >= needed {
                return Some(LineSpan::new(run_start, prev));
            }
            run_start = hit;
            count = 1;
        }
        prev = hit;
    }
    (count >= needed).then(|| LineSpan::new(run_start, prev))
}
