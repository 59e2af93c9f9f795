//! Section segmentation.
//!
//! An explicit state machine walks the classified lines once. Headings open
//! sections; everything else becomes body content with table and equation
//! placeholders put where their content was found.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Range;

use regex::Regex;

use crate::model::{
    CaptionSource, ContentUnit, Equation, EquationSource, Line, LineSpan, Section, SectionKind,
    Table,
};

use super::equation::dedup_key;
use super::patterns::StructurePatterns;

/// Title of the synthetic section used when no heading exists.
pub const FALLBACK_SECTION_TITLE: &str = "Content";

/// Shortest content that locates a position-less equation by text.
const MIN_MATCH_CHARS: usize = 3;

/// Segmenter state.
#[derive(Debug)]
enum State {
    /// Before the first heading; content is held back
    Scanning { pending: Vec<ContentUnit> },
    /// Inside a section
    Open(Section),
}

/// An equation to splice into a specific line.
#[derive(Debug, Clone)]
struct Placement {
    /// Byte range of the raw occurrence; `None` appends after the line
    range: Option<Range<usize>>,
    id: usize,
}

/// Splits classified lines into sections.
pub struct SectionSegmenter<'p> {
    patterns: &'p StructurePatterns,
    ordinal: Regex,
    fallback_min_chars: usize,
}

impl<'p> SectionSegmenter<'p> {
    /// Create a segmenter.
    pub fn new(patterns: &'p StructurePatterns, fallback_min_chars: usize) -> Self {
        Self {
            patterns,
            ordinal: Regex::new(r"(?i)\btable\s+(\d+)\b").unwrap(),
            fallback_min_chars,
        }
    }

    /// Segment the lines. `consumed` holds the front-matter lines.
    pub fn segment(
        &self,
        lines: &[Line],
        consumed: &BTreeSet<usize>,
        tables: &[Table],
        equations: &[Equation],
    ) -> Vec<Section> {
        let regions: Vec<(LineSpan, usize)> = tables
            .iter()
            .filter_map(|t| table_region(t, lines.len()).map(|r| (r, t.id)))
            .collect();
        let placements = self.plan_equations(lines, consumed, &regions, equations);
        let known_tables: HashSet<usize> = tables.iter().map(|t| t.id).collect();

        let mut placed_tables: HashSet<usize> = HashSet::new();
        let mut sections = Vec::new();
        let mut state = State::Scanning {
            pending: Vec::new(),
        };

        for line in lines {
            let idx = line.index;

            if line.is_heading() {
                state = match state {
                    State::Scanning { pending } => {
                        let mut section = self.open_section(line);
                        section.body.extend(pending);
                        State::Open(section)
                    }
                    State::Open(mut current) => {
                        current.span = LineSpan::new(current.span.start, idx.saturating_sub(1));
                        sections.push(current);
                        State::Open(self.open_section(line))
                    }
                };
                continue;
            }

            let mut units = Vec::new();

            if let Some(&(_, id)) = regions.iter().find(|(r, _)| r.contains(idx)) {
                if placed_tables.insert(id) {
                    units.push(ContentUnit::Table(id));
                }
            } else if consumed.contains(&idx) {
                continue;
            } else if line.flags.in_table {
                log::debug!("SectionSegmenter: skipping table cell text at line {}", idx);
                continue;
            } else {
                units.extend(splice_equations(&line.text, placements.get(&idx)));

                for caps in self.ordinal.captures_iter(&line.text) {
                    let Some(id) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok())
                    else {
                        continue;
                    };
                    if known_tables.contains(&id) && placed_tables.insert(id) {
                        units.push(ContentUnit::Table(id));
                    }
                }
            }

            match &mut state {
                State::Scanning { pending } => pending.extend(units),
                State::Open(section) => section.body.extend(units),
            }
        }

        match state {
            State::Open(mut current) => {
                let last = lines.last().map(|l| l.index).unwrap_or(current.span.start);
                current.span = LineSpan::new(current.span.start, last);
                sections.push(current);
            }
            State::Scanning { pending } => {
                if let Some(section) = self.fallback_section(lines, consumed, pending) {
                    sections.push(section);
                }
            }
        }

        log::info!(
            "SectionSegmenter: {} sections, {} tables placed",
            sections.len(),
            placed_tables.len()
        );
        sections
    }

    fn open_section(&self, line: &Line) -> Section {
        match self.patterns.parse_heading(&line.text) {
            Some(heading) => Section::new(
                heading.number,
                heading.title,
                heading.level,
                heading.kind,
                line.index,
            ),
            None => Section::new(
                "",
                line.text.trim_end_matches(':'),
                1,
                SectionKind::Unnumbered,
                line.index,
            ),
        }
    }

    /// One unnumbered section holding all body text, if there is enough of it.
    fn fallback_section(
        &self,
        lines: &[Line],
        consumed: &BTreeSet<usize>,
        units: Vec<ContentUnit>,
    ) -> Option<Section> {
        let text_chars: usize = units
            .iter()
            .map(|u| match u {
                ContentUnit::Text(t) => t.chars().count(),
                _ => 0,
            })
            .sum();
        if text_chars < self.fallback_min_chars {
            log::debug!(
                "SectionSegmenter: no headings and only {} characters of body text",
                text_chars
            );
            return None;
        }

        let mut body_lines = lines.iter().filter(|l| !consumed.contains(&l.index));
        let first = body_lines.next()?.index;
        let last = body_lines.last().map(|l| l.index).unwrap_or(first);

        let mut section =
            Section::new("", FALLBACK_SECTION_TITLE, 1, SectionKind::Unnumbered, first);
        section.span = LineSpan::new(first, last);
        section.body = units;
        Some(section)
    }

    /// Decide where every equation goes before the walk starts.
    ///
    /// Text-sourced equations stay on their line. Position-less ones are
    /// matched by raw or canonical content, then by their trigger line.
    fn plan_equations(
        &self,
        lines: &[Line],
        consumed: &BTreeSet<usize>,
        regions: &[(LineSpan, usize)],
        equations: &[Equation],
    ) -> HashMap<usize, Vec<Placement>> {
        let mut plan: HashMap<usize, Vec<Placement>> = HashMap::new();
        let body_line = |idx: usize| {
            !consumed.contains(&idx)
                && !regions.iter().any(|(r, _)| r.contains(idx))
                && lines.get(idx).is_some_and(|l| !l.is_heading() && !l.flags.in_table)
        };

        for eq in equations {
            if let EquationSource::Text { line, start, end } = eq.source {
                if body_line(line) {
                    plan.entry(line).or_default().push(Placement {
                        range: Some(start..end),
                        id: eq.id,
                    });
                }
            }
        }

        let mut positionless: Vec<&Equation> =
            equations.iter().filter(|e| e.line().is_none()).collect();
        positionless.sort_by_key(|e| e.position_key());

        for eq in positionless {
            let found = lines
                .iter()
                .filter(|l| body_line(l.index))
                .find_map(|l| locate(&l.text, eq).map(|r| (l.index, r)))
                .filter(|(idx, range)| !collides(plan.get(idx), range));

            match found {
                Some((idx, range)) => plan.entry(idx).or_default().push(Placement {
                    range: Some(range),
                    id: eq.id,
                }),
                None => {
                    if let Some(trigger) = &eq.trigger {
                        plan.entry(trigger.line).or_default().push(Placement {
                            range: None,
                            id: eq.id,
                        });
                    }
                }
            }
        }

        plan
    }
}

/// Lines owned by a table: its span plus an adjacent caption line.
fn table_region(table: &Table, line_count: usize) -> Option<LineSpan> {
    let span = table.line_span()?;
    let region = match table.caption_source {
        CaptionSource::Preceding if span.start > 0 => LineSpan::new(span.start - 1, span.end),
        CaptionSource::Following if span.end + 1 < line_count => {
            LineSpan::new(span.start, span.end + 1)
        }
        _ => span,
    };
    Some(region)
}

/// Byte range of an equation's content inside a line.
fn locate(text: &str, eq: &Equation) -> Option<Range<usize>> {
    for needle in [eq.raw_content.trim(), eq.canonical_form.trim()] {
        if needle.chars().count() < MIN_MATCH_CHARS || dedup_key(needle).is_empty() {
            continue;
        }
        if let Some(start) = text.find(needle) {
            return Some(start..start + needle.len());
        }
    }
    None
}

fn collides(existing: Option<&Vec<Placement>>, range: &Range<usize>) -> bool {
    existing.is_some_and(|placements| {
        placements.iter().any(|p| {
            p.range
                .as_ref()
                .is_some_and(|r| r.start < range.end && range.start < r.end)
        })
    })
}

/// Split a line around its equations: text before, placeholder, text after.
fn splice_equations(text: &str, placements: Option<&Vec<Placement>>) -> Vec<ContentUnit> {
    let mut units = Vec::new();
    let Some(placements) = placements else {
        units.push(ContentUnit::Text(text.to_string()));
        return units;
    };

    let mut inline: Vec<&Placement> = placements.iter().filter(|p| p.range.is_some()).collect();
    inline.sort_by_key(|p| p.range.as_ref().map(|r| r.start));

    let mut cursor = 0;
    for placement in inline {
        let Some(range) = placement.range.clone() else {
            continue;
        };
        if range.start < cursor
            || range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            continue;
        }
        push_text(&mut units, &text[cursor..range.start]);
        units.push(ContentUnit::Equation(placement.id));
        cursor = range.end;
    }
    push_text(&mut units, &text[cursor..]);

    units.extend(
        placements
            .iter()
            .filter(|p| p.range.is_none())
            .map(|p| ContentUnit::Equation(p.id)),
    );
    units
}

fn push_text(units: &mut Vec<ContentUnit>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        units.push(ContentUnit::Text(text.to_string()));
    }
}
