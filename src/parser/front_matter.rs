//! Front-matter detection: title, authors, affiliations, abstract, keywords.
//!
//! Every element is optional. When a detector has several candidates the
//! first one in document order wins.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::{DetectedElement, Line};

use super::options::FrontMatterOptions;
use super::patterns::StructurePatterns;

/// Recovered front matter plus the lines it consumed.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    /// Paper title
    pub title: DetectedElement,
    /// Author line
    pub authors: DetectedElement,
    /// Affiliation lines between title and abstract
    pub affiliations: Vec<String>,
    /// Abstract paragraphs joined by blank lines
    pub abstract_text: DetectedElement,
    /// Keywords with the marker stripped
    pub keywords: DetectedElement,
    /// Line indices that belong to the front matter
    pub consumed: BTreeSet<usize>,
}

/// Detects front-matter elements in classified lines.
pub struct FrontMatterDetector<'p> {
    options: FrontMatterOptions,
    patterns: &'p StructurePatterns,
    affiliation: Regex,
}

impl<'p> FrontMatterDetector<'p> {
    /// Create a detector.
    pub fn new(options: FrontMatterOptions, patterns: &'p StructurePatterns) -> Self {
        Self {
            options,
            patterns,
            affiliation: Regex::new(
                r"(?i)(\b(universit(y|ies|é|at|ät|ad|à)|department|dept\.|institut(e|o)?|laborator(y|ies)|lab\b|college|school\s+of|faculty|centre|center\s+for|academy|inc\.|corporation|ltd\.?)\b|@)",
            )
            .unwrap(),
        }
    }

    /// Run all front-matter detectors.
    pub fn detect(&self, lines: &[Line]) -> FrontMatter {
        let mut front = FrontMatter::default();

        front.title = self.detect_title(lines);
        if let Some(title_line) = front.title.line {
            front.consumed.insert(title_line);
            let (authors, affiliations) = self.detect_authors(lines, title_line);
            if let Some(line) = authors.line {
                front.consumed.insert(line);
            }
            for (idx, text) in affiliations {
                front.consumed.insert(idx);
                front.affiliations.push(text);
            }
            front.authors = authors;
        } else {
            front.authors = DetectedElement::not_detected("no title to anchor the author line");
        }

        let (abstract_text, abstract_lines) = self.detect_abstract(lines);
        front.abstract_text = abstract_text;
        front.consumed.extend(abstract_lines);

        let (keywords, keyword_lines) = self.detect_keywords(lines);
        front.keywords = keywords;
        front.consumed.extend(keyword_lines);

        log::debug!(
            "FrontMatterDetector: title={:.2} authors={:.2} abstract={:.2} keywords={:.2}",
            front.title.confidence,
            front.authors.confidence,
            front.abstract_text.confidence,
            front.keywords.confidence
        );
        front
    }

    /// First qualifying line within the title window.
    pub fn detect_title(&self, lines: &[Line]) -> DetectedElement {
        let window = self.options.title_window;

        for line in lines.iter().take(window) {
            if line.flags.abstract_marker {
                break;
            }
            if line.flags.in_table || line.flags.in_equation || line.is_heading() || line.is_marker()
            {
                continue;
            }
            let len = line.len();
            if len < self.options.title_min_chars || len > self.options.title_max_chars {
                continue;
            }
            if self.is_affiliation(&line.text) {
                continue;
            }

            let mut confidence: f32 = 0.6;
            if line.index == 0 {
                confidence += 0.2;
            }
            if line.text.chars().next().is_some_and(|c| c.is_uppercase()) {
                confidence += 0.1;
            }
            if !line.text.ends_with('.') {
                confidence += 0.05;
            }

            return DetectedElement::detected(
                line.text.clone(),
                confidence,
                format!(
                    "first line within the first {} lines that is not a table, equation, heading or marker (line {})",
                    window, line.index
                ),
                line.index,
            );
        }

        DetectedElement::not_detected(format!(
            "no line within the first {} lines fits the title length band {}..={}",
            window, self.options.title_min_chars, self.options.title_max_chars
        ))
    }

    /// Author line after the title, collecting affiliation lines on the way.
    fn detect_authors(
        &self,
        lines: &[Line],
        title_line: usize,
    ) -> (DetectedElement, Vec<(usize, String)>) {
        let mut authors = None;
        let mut affiliations = Vec::new();
        let window_end = title_line + self.options.author_window;

        for line in lines.iter().skip(title_line + 1) {
            if line.is_heading() || line.is_marker() || line.flags.in_table {
                break;
            }
            if self.is_affiliation(&line.text) {
                affiliations.push((line.index, line.text.clone()));
                continue;
            }
            if authors.is_none()
                && line.index <= window_end
                && !line.flags.in_equation
                && line.len() <= self.options.author_max_chars
            {
                authors = Some(line);
                continue;
            }
            if line.index > window_end {
                break;
            }
        }

        let authors = match authors {
            Some(line) => {
                let mut confidence: f32 = 0.7;
                if line.text.contains(',') || line.text.contains(" and ") {
                    confidence += 0.1;
                }
                if line.index == title_line + 1 {
                    confidence += 0.1;
                }
                DetectedElement::detected(
                    line.text.clone(),
                    confidence,
                    format!("short line following the title (line {})", line.index),
                    line.index,
                )
            }
            None => DetectedElement::not_detected(format!(
                "no short non-affiliation line within {} lines after the title",
                self.options.author_window
            )),
        };

        (authors, affiliations)
    }

    /// Abstract marker content plus the lines that follow it.
    fn detect_abstract(&self, lines: &[Line]) -> (DetectedElement, Vec<usize>) {
        let Some(marker) = lines.iter().find(|l| l.flags.abstract_marker) else {
            return (
                DetectedElement::not_detected("no abstract marker"),
                Vec::new(),
            );
        };

        let mut consumed = vec![marker.index];
        let mut paragraphs = Vec::new();
        let inline = self
            .patterns
            .abstract_content(&marker.text)
            .unwrap_or_default();
        if !inline.is_empty() {
            paragraphs.push(inline.to_string());
        }

        for line in lines.iter().skip(marker.index + 1) {
            if line.flags.keyword_marker || line.is_heading() || line.flags.in_table {
                break;
            }
            consumed.push(line.index);
            paragraphs.push(line.text.clone());
        }

        if paragraphs.is_empty() {
            return (
                DetectedElement::not_detected("abstract marker without content"),
                consumed,
            );
        }

        let confidence = if inline.is_empty() { 0.85 } else { 0.9 };
        let reasoning = format!(
            "abstract marker at line {} followed by {} line(s) before the next marker or heading",
            marker.index,
            consumed.len() - 1
        );
        (
            DetectedElement::detected(paragraphs.join("\n\n"), confidence, reasoning, marker.index),
            consumed,
        )
    }

    /// First keyword marker with its prefix stripped.
    fn detect_keywords(&self, lines: &[Line]) -> (DetectedElement, Vec<usize>) {
        let Some(marker) = lines.iter().find(|l| l.flags.keyword_marker) else {
            return (
                DetectedElement::not_detected("no keywords marker"),
                Vec::new(),
            );
        };

        let inline = self
            .patterns
            .keyword_content(&marker.text)
            .unwrap_or_default();
        if !inline.is_empty() {
            return (
                DetectedElement::detected(
                    inline,
                    0.9,
                    format!("keywords marker at line {}", marker.index),
                    marker.index,
                ),
                vec![marker.index],
            );
        }

        // Marker on its own line: the keywords follow on the next one.
        match lines.get(marker.index + 1) {
            Some(next) if !next.is_heading() && !next.is_marker() && !next.flags.in_table => (
                DetectedElement::detected(
                    next.text.clone(),
                    0.8,
                    format!("line after the keywords marker at line {}", marker.index),
                    next.index,
                ),
                vec![marker.index, next.index],
            ),
            _ => (
                DetectedElement::not_detected("keywords marker without content"),
                vec![marker.index],
            ),
        }
    }

    /// Whether a line reads like an institution or contact line.
    pub fn is_affiliation(&self, text: &str) -> bool {
        self.affiliation.is_match(text)
    }
}
