//! Text-level equation detectors.
//!
//! Each detector works on one normalized line and returns scored
//! candidates with byte ranges into that line.

use std::ops::Range;

use regex::Regex;

use crate::model::{DetectionMethod, EquationSource};

use super::canonical::{canonicalize, dedup_key, is_math_symbol, is_operator};

/// Longest right-hand side accepted for an assignment-shaped line.
const MAX_ASSIGNMENT_RHS: usize = 80;
/// Prose words (four letters or more) tolerated on an assignment's right side.
const MAX_ASSIGNMENT_WORDS: usize = 2;

/// An equation hit before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Text as found, delimiters included
    pub raw: String,
    /// Canonical LaTeX notation
    pub canonical: String,
    /// Detector that produced the hit
    pub method: DetectionMethod,
    /// Score in `[0, 1]`
    pub confidence: f32,
    /// Where the hit was found
    pub source: EquationSource,
    /// Text around the hit
    pub context: String,
}

impl Candidate {
    /// Build a scored candidate.
    pub fn new(
        raw: impl Into<String>,
        canonical: String,
        method: DetectionMethod,
        source: EquationSource,
        context: impl Into<String>,
    ) -> Self {
        let confidence = score(method, &canonical);
        Self {
            raw: raw.into(),
            canonical,
            method,
            confidence,
            source,
            context: context.into(),
        }
    }

    fn in_line(
        line_idx: usize,
        line: &str,
        range: Range<usize>,
        canonical: String,
        method: DetectionMethod,
    ) -> Self {
        Self::new(
            &line[range.clone()],
            canonical,
            method,
            EquationSource::Text {
                line: line_idx,
                start: range.start,
                end: range.end,
            },
            line,
        )
    }

    /// Byte range within its line, for text-sourced hits.
    pub fn range(&self) -> Option<(usize, Range<usize>)> {
        match self.source {
            EquationSource::Text { line, start, end } => Some((line, start..end)),
            _ => None,
        }
    }
}

/// Score a hit from its detector and content.
///
/// Structured notation lifts the weak detectors a little; single-character
/// content is penalized.
pub fn score(method: DetectionMethod, canonical: &str) -> f32 {
    let mut confidence = method.base_confidence();
    let key = dedup_key(canonical);

    let structured = key.contains('\\') || key.contains('^') || key.contains('_');
    if structured && matches!(method, DetectionMethod::SymbolRun | DetectionMethod::Assignment) {
        confidence += 0.05;
    }
    if key.chars().count() < 2 {
        confidence -= 0.2;
    }
    confidence.clamp(0.0, 1.0)
}

fn overlaps(range: &Range<usize>, claimed: &[Range<usize>]) -> bool {
    claimed
        .iter()
        .any(|c| range.start < c.end && c.start < range.end)
}

/// Compiled text detectors.
pub struct TextDetectors {
    display_dollar: Regex,
    display_bracket: Regex,
    inline_paren: Regex,
    inline_dollar: Regex,
    frac: Regex,
    sum: Regex,
    assignment: Regex,
    trigger: Regex,
}

impl TextDetectors {
    /// Compile the detectors.
    pub fn new() -> Self {
        Self {
            display_dollar: Regex::new(r"\$\$(.+?)\$\$").unwrap(),
            display_bracket: Regex::new(r"\\\[(.+?)\\\]").unwrap(),
            inline_paren: Regex::new(r"\\\((.+?)\\\)").unwrap(),
            inline_dollar: Regex::new(r"\$([^\s$](?:[^$\n]*[^\s$])?)\$").unwrap(),
            frac: Regex::new(r"\\frac\{[^{}]*\}\{[^{}]*\}").unwrap(),
            sum: Regex::new(
                r"\\sum(?:_(?:\{[^{}]*\}|\w))?(?:\^(?:\{[^{}]*\}|\w))?(?:\s*[A-Za-z0-9_^{}()+\-*/]+)?",
            )
            .unwrap(),
            assignment: Regex::new(r"^([A-Za-z][A-Za-z0-9_]{0,9})\s*=\s*(.+)$").unwrap(),
            trigger: Regex::new(
                r"(?i)\b(?:the\s+following\s+(?:equation|formula|expression)s?|(?:is|are)\s+given\s+by|as\s+follows|below\s+is\b.*\b(?:formula|equation))",
            )
            .unwrap(),
        }
    }

    /// `$$…$$`, `\[…\]`, `\(…\)` and `$…$` hits, display forms first.
    pub fn delimited(&self, line_idx: usize, line: &str) -> Vec<Candidate> {
        let mut hits: Vec<Candidate> = Vec::new();
        let mut claimed: Vec<Range<usize>> = Vec::new();

        let passes = [
            (&self.display_dollar, DetectionMethod::DisplayDelimiter),
            (&self.display_bracket, DetectionMethod::DisplayDelimiter),
            (&self.inline_paren, DetectionMethod::InlineDelimiter),
            (&self.inline_dollar, DetectionMethod::InlineDelimiter),
        ];

        for (pattern, method) in passes {
            for caps in pattern.captures_iter(line) {
                let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let range = whole.range();
                if overlaps(&range, &claimed) {
                    continue;
                }
                let canonical = canonicalize(inner.as_str());
                if canonical.is_empty() {
                    continue;
                }
                log::debug!(
                    "EquationDetector: {} at line {}: {}",
                    method,
                    line_idx,
                    whole.as_str()
                );
                claimed.push(range.clone());
                hits.push(Candidate::in_line(line_idx, line, range, canonical, method));
            }
        }

        hits
    }

    /// Literal `\frac{…}{…}` and `\sum` outside already claimed ranges.
    pub fn control_sequences(
        &self,
        line_idx: usize,
        line: &str,
        claimed: &[Range<usize>],
    ) -> Vec<Candidate> {
        let mut hits = Vec::new();
        let mut taken: Vec<Range<usize>> = claimed.to_vec();

        for pattern in [&self.frac, &self.sum] {
            for m in pattern.find_iter(line) {
                let range = m.range();
                if overlaps(&range, &taken) {
                    continue;
                }
                taken.push(range.clone());
                hits.push(Candidate::in_line(
                    line_idx,
                    line,
                    range,
                    canonicalize(m.as_str()),
                    DetectionMethod::ControlSequence,
                ));
            }
        }

        hits
    }

    /// Maximal runs of math-looking tokens with a Unicode symbol and an operator.
    pub fn symbol_runs(
        &self,
        line_idx: usize,
        line: &str,
        claimed: &[Range<usize>],
    ) -> Vec<Candidate> {
        let mut hits = Vec::new();
        let tokens = tokenize(line);
        let mut i = 0;

        while i < tokens.len() {
            if !is_math_token(&line[tokens[i].clone()]) {
                i += 1;
                continue;
            }
            let mut j = i;
            while j + 1 < tokens.len() && is_math_token(&line[tokens[j + 1].clone()]) {
                j += 1;
            }

            // Drop short words hanging off either end of the run.
            let mut first = i;
            let mut last = j;
            while first <= last && is_word(&line[tokens[first].clone()]) {
                first += 1;
            }
            while last > first && is_word(&line[tokens[last].clone()]) {
                last -= 1;
            }

            if first <= last {
                let range = tokens[first].start..tokens[last].end;
                let raw = &line[range.clone()];
                let has_symbol = raw.chars().any(is_math_symbol);
                let has_operator = raw.chars().any(is_operator);
                if has_symbol && has_operator && !overlaps(&range, claimed) {
                    hits.push(Candidate::in_line(
                        line_idx,
                        line,
                        range,
                        canonicalize(raw),
                        DetectionMethod::SymbolRun,
                    ));
                }
            }
            i = j + 1;
        }

        hits
    }

    /// A whole line shaped `identifier = expression`.
    pub fn assignment(
        &self,
        line_idx: usize,
        line: &str,
        claimed: &[Range<usize>],
    ) -> Option<Candidate> {
        if !claimed.is_empty() {
            return None;
        }
        let caps = self.assignment.captures(line)?;
        let rhs = caps.get(2)?.as_str().trim();

        if rhs.chars().count() > MAX_ASSIGNMENT_RHS {
            return None;
        }
        let words = rhs
            .split_whitespace()
            .filter(|w| w.chars().filter(|c| c.is_alphabetic()).count() >= 4)
            .count();
        let has_math = rhs
            .chars()
            .any(|c| c.is_ascii_digit() || is_operator(c) || is_math_symbol(c));
        if words > MAX_ASSIGNMENT_WORDS || !has_math {
            return None;
        }

        Some(Candidate::in_line(
            line_idx,
            line,
            0..line.len(),
            canonicalize(line),
            DetectionMethod::Assignment,
        ))
    }

    /// Contextual phrase announcing an equation.
    pub fn trigger(&self, line: &str) -> Option<String> {
        self.trigger
            .find(line)
            .map(|m| m.as_str().to_lowercase())
    }
}

impl Default for TextDetectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte ranges of whitespace-separated tokens, trailing sentence punctuation trimmed.
fn tokenize(line: &str) -> Vec<Range<usize>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices().chain(std::iter::once((line.len(), ' '))) {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                let token = &line[s..i];
                let trimmed = token.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'));
                if !trimmed.is_empty() {
                    tokens.push(s..s + trimmed.len());
                }
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    tokens
}

fn is_word(token: &str) -> bool {
    token.chars().count() >= 2 && token.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_math_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if token.chars().all(|c| c.is_ascii_alphabetic()) {
        return token.len() <= 2;
    }
    token.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || is_math_symbol(c)
            || is_operator(c)
            || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '|' | ',' | '.' | '\'' | '_' | '!')
    })
}
