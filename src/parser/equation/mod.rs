//! Equation extraction.
//!
//! Runs the independent detectors over the text lines, the math markup
//! fragments and the HTML rendering, then merges their hits:
//!
//! 1. drop hits below the minimum confidence
//! 2. order by confidence (descending), then source position
//! 3. discard hits overlapping or duplicating an accepted one
//! 4. pair position-less equations with contextual trigger sentences
//! 5. assign ids 1.. in the final order

mod canonical;
mod detectors;
mod markup;

pub use canonical::{canonicalize, dedup_key};
pub use detectors::{Candidate, TextDetectors};
pub use markup::MarkupConverter;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Range;

use crate::model::{ContextTrigger, DetectionMethod, Equation, EquationSource, LineSpan};

use super::html::HtmlSource;
use super::options::EquationOptions;

/// Shortest dedup key that takes part in substring matching.
const MIN_SUBSTRING_KEY: usize = 3;

/// Result of equation extraction.
#[derive(Debug, Clone, Default)]
pub struct EquationExtraction {
    /// Accepted equations with ids 1..
    pub equations: Vec<Equation>,
    /// Lines consisting entirely of one equation
    pub equation_lines: HashSet<usize>,
    /// Contextual trigger sentences in document order
    pub triggers: Vec<ContextTrigger>,
}

/// Detects, scores and merges equations.
pub struct EquationExtractor {
    options: EquationOptions,
    detectors: TextDetectors,
    markup: MarkupConverter,
}

impl EquationExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::with_options(EquationOptions::default())
    }

    /// Create an extractor with custom options.
    pub fn with_options(options: EquationOptions) -> Self {
        Self {
            options,
            detectors: TextDetectors::new(),
            markup: MarkupConverter::new(),
        }
    }

    /// Extract equations from all encodings of one document.
    ///
    /// Lines inside `table_spans` are not scanned.
    pub fn extract(
        &self,
        lines: &[String],
        fragments: &[String],
        html: Option<&HtmlSource>,
        table_spans: &[LineSpan],
    ) -> EquationExtraction {
        let mut candidates = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if table_spans.iter().any(|s| s.contains(idx)) {
                continue;
            }
            candidates.extend(self.scan_line(idx, line));
        }

        if self.options.markup {
            let mut all_fragments: Vec<String> = fragments.to_vec();
            if let Some(html) = html {
                all_fragments.extend(html.math_elements());
            }
            for (index, xml) in all_fragments.iter().enumerate() {
                if let Some(candidate) = self.convert_fragment(index, xml) {
                    candidates.push(candidate);
                }
            }
        }

        if self.options.font_hints {
            if let Some(html) = html {
                for (index, span) in html
                    .math_font_spans(&self.options.math_fonts)
                    .into_iter()
                    .enumerate()
                {
                    let canonical = canonicalize(&span);
                    candidates.push(Candidate::new(
                        span.clone(),
                        canonical,
                        DetectionMethod::FontHint,
                        EquationSource::Html { index },
                        span,
                    ));
                }
            }
        }

        let triggers: Vec<ContextTrigger> = lines
            .iter()
            .enumerate()
            .filter(|(idx, _)| !table_spans.iter().any(|s| s.contains(*idx)))
            .filter_map(|(idx, line)| {
                self.detectors.trigger(line).map(|phrase| ContextTrigger {
                    line: idx,
                    phrase,
                })
            })
            .collect();

        let total = candidates.len();
        let equations = self.merge(candidates, &triggers, lines);
        let equation_lines = equations
            .iter()
            .filter_map(|eq| match eq.source {
                EquationSource::Text { line, start, end }
                    if start == 0 && lines.get(line).map(|l| l.len()) == Some(end) =>
                {
                    Some(line)
                }
                _ => None,
            })
            .collect();

        log::info!(
            "EquationExtractor: {} equations accepted from {} candidates",
            equations.len(),
            total
        );

        EquationExtraction {
            equations,
            equation_lines,
            triggers,
        }
    }

    /// Run the enabled text detectors over one line.
    fn scan_line(&self, idx: usize, line: &str) -> Vec<Candidate> {
        let mut hits = Vec::new();
        let mut claimed: Vec<Range<usize>> = Vec::new();

        if self.options.delimiters {
            let delimited = self.detectors.delimited(idx, line);
            claimed.extend(delimited.iter().filter_map(|c| c.range().map(|(_, r)| r)));
            hits.extend(delimited);

            let sequences = self.detectors.control_sequences(idx, line, &claimed);
            claimed.extend(sequences.iter().filter_map(|c| c.range().map(|(_, r)| r)));
            hits.extend(sequences);
        }

        if self.options.symbol_runs {
            hits.extend(self.detectors.symbol_runs(idx, line, &claimed));
            hits.extend(self.detectors.assignment(idx, line, &claimed));
        }

        hits
    }

    fn convert_fragment(&self, index: usize, xml: &str) -> Option<Candidate> {
        let source = EquationSource::Fragment { index };
        match self.markup.convert(xml) {
            Ok(latex) => Some(Candidate::new(
                xml,
                latex,
                DetectionMethod::Markup,
                source,
                String::new(),
            )),
            Err(e) => {
                let flattened = self.markup.flatten(xml);
                log::warn!(
                    "EquationExtractor: fragment {} flattened to text ({})",
                    index,
                    e
                );
                if flattened.is_empty() {
                    return None;
                }
                Some(Candidate::new(
                    xml,
                    flattened,
                    DetectionMethod::MarkupFlattened,
                    source,
                    String::new(),
                ))
            }
        }
    }

    /// Filter, order, deduplicate, pair with triggers and number the candidates.
    fn merge(
        &self,
        mut candidates: Vec<Candidate>,
        triggers: &[ContextTrigger],
        lines: &[String],
    ) -> Vec<Equation> {
        let min = self.options.min_confidence;
        candidates.retain(|c| c.confidence >= min && !dedup_key(&c.canonical).is_empty());
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.source.position_key().cmp(&b.source.position_key()))
        });

        let mut accepted: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            let key = dedup_key(&candidate.canonical);
            if accepted.iter().any(|a| same_region(a, &candidate)) {
                log::debug!(
                    "EquationExtractor: discarding {} hit '{}' overlapping an accepted hit",
                    candidate.method,
                    candidate.canonical
                );
                continue;
            }
            let Some(kept) = accepted
                .iter_mut()
                .find(|a| is_duplicate(&dedup_key(&a.canonical), &key))
            else {
                accepted.push(candidate);
                continue;
            };
            log::debug!(
                "EquationExtractor: discarding {} hit '{}' as duplicate of {} hit",
                candidate.method,
                candidate.canonical,
                kept.method
            );
            // The kept hit inherits the text position so the whole occurrence is replaced.
            if kept.range().is_none() && candidate.range().is_some() {
                kept.source = candidate.source;
                kept.context = candidate.context;
            }
        }

        // Position-less equations take trigger sentences in source order.
        let mut positionless: Vec<usize> = accepted
            .iter()
            .enumerate()
            .filter(|(_, c)| c.range().is_none())
            .map(|(i, _)| i)
            .collect();
        positionless.sort_by_key(|&i| accepted[i].source.position_key());
        let mut paired: Vec<Option<&ContextTrigger>> = vec![None; accepted.len()];
        for (&i, trigger) in positionless.iter().zip(triggers) {
            paired[i] = Some(trigger);
        }

        accepted
            .into_iter()
            .zip(paired)
            .enumerate()
            .map(|(i, (candidate, trigger))| {
                let context = match (trigger, candidate.context.is_empty()) {
                    (Some(t), _) => lines.get(t.line).cloned().unwrap_or_default(),
                    (None, true) => candidate.raw.clone(),
                    (None, false) => candidate.context.clone(),
                };
                Equation {
                    id: i + 1,
                    raw_content: candidate.raw,
                    canonical_form: candidate.canonical,
                    method: candidate.method,
                    confidence: candidate.confidence,
                    source: candidate.source,
                    surrounding_context: context,
                    trigger: trigger.cloned(),
                }
            })
            .collect()
    }
}

impl Default for EquationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether two text hits overlap on the same line.
fn same_region(a: &Candidate, b: &Candidate) -> bool {
    match (a.range(), b.range()) {
        (Some((la, ra)), Some((lb, rb))) => la == lb && ra.start < rb.end && rb.start < ra.end,
        _ => false,
    }
}

/// Equal keys, or one contained in the other.
fn is_duplicate(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    shorter.chars().count() >= MIN_SUBSTRING_KEY && longer.contains(shorter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_inline_equation() {
        let input = lines("The result is $x^2+1$ here.");
        let extraction = EquationExtractor::new().extract(&input, &[], None, &[]);

        assert_eq!(extraction.equations.len(), 1);
        let eq = &extraction.equations[0];
        assert_eq!(eq.id, 1);
        assert_eq!(eq.canonical_form, "x^2+1");
        assert!(eq.confidence > 0.35);
        assert!(extraction.equation_lines.is_empty());
    }

    #[test]
    fn test_duplicates_keep_highest_confidence() {
        let fragment = "<m:oMath><m:sSup><m:e><m:r><m:t>x</m:t></m:r></m:e>\
                        <m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup>\
                        <m:r><m:t>+1</m:t></m:r></m:oMath>";
        let input = lines("The result is $x^2+1$ here.");
        let extraction =
            EquationExtractor::new().extract(&input, &[fragment.to_string()], None, &[]);

        assert_eq!(extraction.equations.len(), 1);
        let eq = &extraction.equations[0];
        assert_eq!(eq.method, DetectionMethod::Markup);
        assert_eq!(
            eq.source,
            EquationSource::Text {
                line: 0,
                start: 14,
                end: 21
            }
        );
        assert_eq!(eq.surrounding_context, input[0]);
        assert!(eq.trigger.is_none());
    }

    #[test]
    fn test_ordering_and_ids() {
        let input = lines("$$a+b=c$$\nwhere α ≤ β + 1 holds\nand $y = 2x$ too");
        let extraction = EquationExtractor::new().extract(&input, &[], None, &[]);

        let methods: Vec<DetectionMethod> =
            extraction.equations.iter().map(|e| e.method).collect();
        assert_eq!(
            methods,
            vec![
                DetectionMethod::DisplayDelimiter,
                DetectionMethod::InlineDelimiter,
                DetectionMethod::SymbolRun
            ]
        );
        let ids: Vec<usize> = extraction.equations.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(extraction.equation_lines.contains(&0));
    }

    #[test]
    fn test_min_confidence_filter() {
        let options = EquationOptions {
            min_confidence: 0.5,
            ..Default::default()
        };
        let input = lines("E = mc^2");
        let extraction = EquationExtractor::with_options(options).extract(&input, &[], None, &[]);
        assert!(extraction.equations.is_empty());
    }

    #[test]
    fn test_malformed_fragment_is_flattened() {
        let input: Vec<String> = Vec::new();
        let extraction = EquationExtractor::new().extract(
            &input,
            &["<m:oMath><m:r><m:t>a+b".to_string()],
            None,
            &[],
        );
        assert_eq!(extraction.equations.len(), 1);
        assert_eq!(extraction.equations[0].method, DetectionMethod::MarkupFlattened);
        assert_eq!(extraction.equations[0].canonical_form, "a+b");
    }

    #[test]
    fn test_trigger_pairing() {
        let input = lines("We use the following equation to measure loss.");
        let fragment = "<math><mi>L</mi><mo>=</mo><mn>0</mn></math>";
        let extraction =
            EquationExtractor::new().extract(&input, &[fragment.to_string()], None, &[]);

        assert_eq!(extraction.triggers.len(), 1);
        let eq = &extraction.equations[0];
        assert_eq!(eq.trigger.as_ref().map(|t| t.line), Some(0));
        assert_eq!(eq.surrounding_context, input[0]);
    }

    #[test]
    fn test_table_lines_are_skipped() {
        let input = lines("||====||\n||$x$|y||\n||====||");
        let extraction =
            EquationExtractor::new().extract(&input, &[], None, &[LineSpan::new(0, 2)]);
        assert!(extraction.equations.is_empty());
    }

    #[test]
    fn test_is_duplicate() {
        assert!(is_duplicate("x^2+1", "x^2+1"));
        assert!(is_duplicate("x^2", "x^2+1"));
        assert!(!is_duplicate("x", "x+y"));
    }
}
