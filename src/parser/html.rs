//! Reader for the HTML rendering of a manuscript.
//!
//! Exposes the pieces the extractors need: native tables, spans set in a
//! math font, embedded `<math>` elements, and a line-per-block text view.

use scraper::{ElementRef, Html, Selector};

/// Block elements that produce one text line each.
const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, td, th, caption, pre, blockquote";
const BLOCK_NAMES: [&str; 13] = [
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "td",
    "th",
    "caption",
    "pre",
    "blockquote",
];

/// A `<table>` element read from the HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    /// Document-order index among all tables
    pub index: usize,
    /// Cell text, row by row
    pub rows: Vec<Vec<String>>,
    /// `<caption>` text, if any
    pub caption: Option<String>,
    /// Whether the first row consists of `<th>` cells
    pub header_cells: bool,
}

/// Parsed HTML rendering.
pub struct HtmlSource {
    html: Html,
}

impl HtmlSource {
    /// Parse an HTML document or fragment.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Read all tables with their rows and captions.
    pub fn tables(&self) -> Vec<HtmlTable> {
        let (Ok(table_sel), Ok(row_sel), Ok(cell_sel), Ok(caption_sel)) = (
            Selector::parse("table"),
            Selector::parse("tr"),
            Selector::parse("td, th"),
            Selector::parse("caption"),
        ) else {
            return Vec::new();
        };

        let mut tables = Vec::new();
        for (index, table) in self.html.select(&table_sel).enumerate() {
            let mut rows = Vec::new();
            let mut header_cells = false;

            for row in table
                .select(&row_sel)
                .filter(|row| owning_table(row).map(|t| t.id()) == Some(table.id()))
            {
                let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
                if cells.is_empty() {
                    continue;
                }
                if rows.is_empty() {
                    header_cells = cells.iter().all(|c| c.value().name() == "th");
                }
                rows.push(cells.iter().map(|c| element_text(c)).collect::<Vec<_>>());
            }

            let caption = table
                .select(&caption_sel)
                .next()
                .map(|c| element_text(&c))
                .filter(|c| !c.is_empty());

            tables.push(HtmlTable {
                index,
                rows,
                caption,
                header_cells,
            });
        }
        tables
    }

    /// Text of spans whose font family matches one of `fonts` (lower-case substrings).
    pub fn math_font_spans(&self, fonts: &[String]) -> Vec<String> {
        let Ok(selector) = Selector::parse("span[style], font[face]") else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .filter(|el| {
                let value = el.value();
                let family = value
                    .attr("style")
                    .and_then(font_family)
                    .or_else(|| value.attr("face").map(|f| f.to_lowercase()));
                match family {
                    Some(family) => fonts.iter().any(|f| family.contains(f.as_str())),
                    None => false,
                }
            })
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Serialized `<math>` elements embedded in the HTML.
    pub fn math_elements(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("math") else {
            return Vec::new();
        };
        self.html.select(&selector).map(|el| el.html()).collect()
    }

    /// One line per outermost block element, in document order.
    pub fn text_lines(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse(BLOCK_SELECTOR) else {
            return Vec::new();
        };

        let lines: Vec<String> = self
            .html
            .select(&selector)
            .filter(|el| !has_block_ancestor(el))
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect();

        if lines.is_empty() {
            // No block markup: fall back to the raw text flow.
            return self
                .html
                .root_element()
                .text()
                .flat_map(|t| t.lines())
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
        }
        lines
    }
}

fn owning_table<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn has_block_ancestor(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BLOCK_NAMES.contains(&a.value().name()))
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the lower-cased `font-family` value from an inline style.
fn font_family(style: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("font-family") {
            Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase())
        } else {
            None
        }
    })
}
