//! Line normalization for raw manuscript text.
//!
//! Produces the blank-stripped, trimmed line sequence every later stage
//! indexes into.

use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Splits raw text into normalized, non-empty lines.
#[derive(Debug, Clone)]
pub struct LineNormalizer {
    unicode: bool,
}

impl LineNormalizer {
    /// Create a normalizer. With `unicode` set, lines are NFC-normalized and
    /// ligatures are expanded.
    pub fn new(unicode: bool) -> Self {
        Self { unicode }
    }

    /// Normalize raw text into trimmed, non-empty lines.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        raw.split(|c| c == '\n' || c == '\r')
            .map(|line| self.normalize_line(line))
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Normalize a single line.
    pub fn normalize_line(&self, line: &str) -> String {
        let mut text: String = if self.unicode {
            line.nfc().collect()
        } else {
            line.to_string()
        };

        if self.unicode {
            for (ligature, replacement) in LIGATURES {
                if text.contains(ligature) {
                    text = text.replace(ligature, replacement);
                }
            }
        }

        collapse_whitespace(&strip_invisible(&text))
    }
}

impl Default for LineNormalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Drop replacement characters, Private Use Area code points and zero-width marks.
fn strip_invisible(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            *c != '\u{FFFD}'
                && *c != '\u{200B}'
                && *c != '\u{FEFF}'
                && !(0xE000..=0xF8FF).contains(&code)
        })
        .collect()
}

/// Trim and collapse runs of whitespace (tabs, NBSP) to single spaces.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_stripped() {
        let lines = LineNormalizer::default().normalize("Title\n\n   \r\n  Body text  \n");
        assert_eq!(lines, vec!["Title", "Body text"]);
    }

    #[test]
    fn test_ligatures_and_whitespace() {
        let normalizer = LineNormalizer::default();
        assert_eq!(
            normalizer.normalize_line("\u{FB01}nal\t\u{00A0} e\u{FB00}ect"),
            "final effect"
        );
    }

    #[test]
    fn test_raw_mode_keeps_ligatures() {
        let normalizer = LineNormalizer::new(false);
        assert_eq!(normalizer.normalize_line("\u{FB01}x"), "\u{FB01}x");
    }

    #[test]
    fn test_invisible_characters_removed() {
        let normalizer = LineNormalizer::default();
        assert_eq!(normalizer.normalize_line("a\u{200B}b\u{FFFD}c"), "abc");
    }
}
