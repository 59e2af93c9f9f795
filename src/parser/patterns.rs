//! Heading and front-matter marker patterns.

use regex::Regex;

use crate::model::SectionKind;

/// Longest heading title accepted, in characters.
const MAX_HEADING_CHARS: usize = 120;
/// Most words a heading title may contain.
const MAX_HEADING_WORDS: usize = 15;

/// A recognized section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Numbering as written, including a trailing dot if present
    pub number: String,
    /// Title after the numbering
    pub title: String,
    /// Nesting depth
    pub level: u8,
    /// Numbering style
    pub kind: SectionKind,
}

/// Compiled patterns for headings and front-matter markers.
pub struct StructurePatterns {
    arabic: Regex,
    roman: Regex,
    abstract_marker: Regex,
    keyword_marker: Regex,
    references: Regex,
    citation: Regex,
}

impl StructurePatterns {
    /// Compile the patterns.
    pub fn new() -> Self {
        Self {
            arabic: Regex::new(r"^(\d{1,3}(?:\.\d{1,3})*)(\.?)\s+(\S.*)$").unwrap(),
            roman: Regex::new(r"^([IVX]{1,6})(\.?)\s+(\S.*)$").unwrap(),
            abstract_marker: Regex::new(r"(?i)^abstract\b\s*[:\-\u{2013}\u{2014}.]?\s*(.*)$")
                .unwrap(),
            keyword_marker: Regex::new(
                r"(?i)^(?:key\s?words?|index\s+terms)\b\s*[:\-\u{2013}\u{2014}.]?\s*(.*)$",
            )
            .unwrap(),
            references: Regex::new(r"(?i)^(?:references|bibliography)\s*:?$").unwrap(),
            citation: Regex::new(
                r"\b(?:1[6-9]|20)\d{2}[a-z]?\b|\b\p{Lu}\.\s|\bet al\b|\bpp?\.\s*\d",
            )
            .unwrap(),
        }
    }

    /// Parse an arabic or roman heading.
    pub fn parse_heading(&self, text: &str) -> Option<Heading> {
        self.parse_arabic(text).or_else(|| self.parse_roman(text))
    }

    fn parse_arabic(&self, text: &str) -> Option<Heading> {
        let caps = self.arabic.captures(text)?;
        let digits = caps.get(1)?.as_str();
        let dotted = !caps.get(2)?.as_str().is_empty();
        let title = caps.get(3)?.as_str().trim();

        if !plausible_title(title) {
            return None;
        }
        // "10 participants were..." is prose; an undotted single group needs a capital.
        let single_group = !digits.contains('.');
        if single_group && !dotted && !starts_uppercase(title) {
            return None;
        }

        let level = digits.split('.').count().min(u8::MAX as usize) as u8;
        Some(Heading {
            number: format!("{}{}", digits, if dotted { "." } else { "" }),
            title: title.to_string(),
            level,
            kind: SectionKind::Arabic,
        })
    }

    fn parse_roman(&self, text: &str) -> Option<Heading> {
        let caps = self.roman.captures(text)?;
        let numeral = caps.get(1)?.as_str();
        let dotted = !caps.get(2)?.as_str().is_empty();
        let title = caps.get(3)?.as_str().trim();

        if !plausible_title(title) || !starts_uppercase(title) || !is_valid_roman(numeral) {
            return None;
        }
        // "I think..." is prose; without a dot the title must be set in capitals.
        if !dotted && !is_all_caps(title) {
            return None;
        }

        Some(Heading {
            number: format!("{}{}", numeral, if dotted { "." } else { "" }),
            title: title.to_string(),
            level: 1,
            kind: SectionKind::Roman,
        })
    }

    /// Whether the line starts with an abstract marker.
    pub fn is_abstract_marker(&self, text: &str) -> bool {
        self.abstract_marker.is_match(text)
    }

    /// Content following the abstract marker (may be empty).
    pub fn abstract_content<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.abstract_marker
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Whether the line starts with a keywords / index terms marker.
    pub fn is_keyword_marker(&self, text: &str) -> bool {
        self.keyword_marker.is_match(text)
    }

    /// Keyword string with the marker prefix stripped.
    pub fn keyword_content<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.keyword_marker
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
    }

    /// Whether a heading title reads like a bibliography entry
    /// (a year, an author initial, "et al." or a page range).
    pub fn looks_like_citation(&self, title: &str) -> bool {
        self.citation.is_match(title)
    }

    /// Whether the line is a bare "References" / "Bibliography" heading.
    pub fn is_references_marker(&self, text: &str) -> bool {
        self.references.is_match(text)
    }
}

impl Default for StructurePatterns {
    fn default() -> Self {
        Self::new()
    }
}

fn plausible_title(title: &str) -> bool {
    let chars = title.chars().count();
    let first_is_letter = title.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false);
    first_is_letter
        && chars <= MAX_HEADING_CHARS
        && title.split_whitespace().count() <= MAX_HEADING_WORDS
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_uppercase())
}

/// Accepts canonical numerals I..XXXIX built from I, V and X.
fn is_valid_roman(numeral: &str) -> bool {
    let value = roman_value(numeral);
    value > 0 && to_roman(value) == numeral
}

fn roman_value(numeral: &str) -> u32 {
    let digit = |c: char| match c {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        _ => 0,
    };
    let chars: Vec<u32> = numeral.chars().map(digit).collect();
    let mut total = 0;
    for (i, value) in chars.iter().enumerate() {
        match chars.get(i + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }
    total.max(0) as u32
}

fn to_roman(mut num: u32) -> String {
    let numerals = [(10, "X"), (9, "IX"), (5, "V"), (4, "IV"), (1, "I")];

    let mut result = String::new();
    for (value, symbol) in numerals {
        while num >= value {
            result.push_str(symbol);
            num -= value;
        }
    }
    result
}
