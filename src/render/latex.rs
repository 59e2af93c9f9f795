//! LaTeX serialization of the document model.

use std::collections::HashSet;
use std::fmt::Write;

use regex::Regex;

use crate::error::Result;
use crate::model::{
    scan_placeholders, ContentUnit, DetectionMethod, DocumentModel, PlaceholderRef, Section,
    SectionKind, Table,
};

use super::layout::{optimize_table, AbbreviationLevel, Abbreviator, TableEnvironment};
use super::template::{AuthorBlockStyle, BorderStyle, KeywordStyle, TemplateProfile};
use super::{RenderOptions, RenderResult, SerializationStats};

/// Title used when none was detected.
pub const DEFAULT_TITLE: &str = "Untitled Document";
/// Author line used when none was detected.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Convert a document model to LaTeX.
pub fn to_latex(doc: &DocumentModel, options: &RenderOptions) -> Result<String> {
    LatexRenderer::new(options.clone()).render(doc)
}

/// Convert a document model to LaTeX with statistics.
pub fn to_latex_with_stats(doc: &DocumentModel, options: &RenderOptions) -> Result<RenderResult> {
    LatexRenderer::new(options.clone()).render_with_stats(doc)
}

/// A rendered piece of section body.
enum Block {
    Paragraph(String),
    Display(String),
    Float(String),
}

/// A table or equation that no placeholder references.
#[derive(Debug, Clone, Copy)]
enum Item {
    Table(usize),
    Equation(usize),
}

/// LaTeX renderer for one template profile.
pub struct LatexRenderer {
    profile: TemplateProfile,
    options: RenderOptions,
    abbreviator: Abbreviator,
    bracket_citation: Regex,
    numbered_citation: Regex,
    stats: SerializationStats,
    rendered_tables: HashSet<usize>,
    rendered_equations: HashSet<usize>,
}

impl LatexRenderer {
    /// Create a renderer for the template named in `options`.
    pub fn new(options: RenderOptions) -> Self {
        let profile = options.profile();
        Self::with_profile(profile, options)
    }

    /// Create a renderer for an explicit profile.
    pub fn with_profile(profile: TemplateProfile, options: RenderOptions) -> Self {
        Self {
            abbreviator: profile.abbreviations.compile(),
            profile,
            options,
            bracket_citation: Regex::new(r"\[\d+\]").unwrap(),
            numbered_citation: Regex::new(r"(?m)^\d+\.\s+").unwrap(),
            stats: SerializationStats::new(),
            rendered_tables: HashSet::new(),
            rendered_equations: HashSet::new(),
        }
    }

    /// Render a document to LaTeX.
    pub fn render(mut self, doc: &DocumentModel) -> Result<String> {
        self.render_internal(doc)
    }

    /// Render a document to LaTeX with serialization statistics.
    pub fn render_with_stats(mut self, doc: &DocumentModel) -> Result<RenderResult> {
        let content = self.render_internal(doc)?;
        Ok(RenderResult::new(content, self.profile.kind, self.stats))
    }

    fn render_internal(&mut self, doc: &DocumentModel) -> Result<String> {
        let mut out = String::new();

        self.render_preamble(&mut out)?;
        writeln!(out, "\\begin{{document}}\n")?;
        self.render_front_matter(&mut out, doc)?;

        let appendix = self.plan_appendix(doc);
        let mut bibliography_done = false;

        for (idx, section) in doc.sections.iter().enumerate() {
            if section.is_references() && !bibliography_done {
                bibliography_done = true;
                let mut blocks = Vec::new();
                for unit in &section.body {
                    if !matches!(unit, ContentUnit::Text(_)) {
                        self.render_unit(&mut blocks, unit, doc);
                    }
                }
                self.render_appended(&mut blocks, &appendix[idx], doc);
                push_blocks(&mut out, blocks);
                self.render_bibliography(&mut out, section)?;
                continue;
            }

            self.stats.add_section();
            let (command, starred) = heading_command(section);
            writeln!(
                out,
                "\\{}{}{{{}}}\n",
                command,
                if starred { "*" } else { "" },
                escape_latex(&section.title)
            )?;

            let mut blocks = Vec::new();
            for unit in &section.body {
                self.render_unit(&mut blocks, unit, doc);
            }
            self.render_appended(&mut blocks, &appendix[idx], doc);
            push_blocks(&mut out, blocks);
        }

        if doc.sections.is_empty() {
            let mut blocks = Vec::new();
            self.render_appended(&mut blocks, &appendix[0], doc);
            push_blocks(&mut out, blocks);
        }

        if !bibliography_done && self.options.bibliography_stub {
            writeln!(out, "\\bibliographystyle{{{}}}", self.profile.bibliography_style)?;
            writeln!(out, "\\bibliography{{references}}\n")?;
        }

        out.push_str("\\end{document}\n");

        if self.stats.dangling_count > 0 {
            log::warn!(
                "LatexRenderer: {} dangling placeholders rendered literally",
                self.stats.dangling_count
            );
        }
        log::info!(
            "LatexRenderer[{}]: {} sections, {} tables, {} equations, {} appended",
            self.profile.kind,
            self.stats.section_count,
            self.stats.table_count,
            self.stats.equation_count,
            self.stats.appended_count
        );
        Ok(out)
    }

    fn render_preamble(&self, out: &mut String) -> Result<()> {
        writeln!(out, "{}", self.profile.document_class)?;
        for package in &self.profile.packages {
            writeln!(out, "\\usepackage{{{}}}", package)?;
        }
        out.push('\n');
        Ok(())
    }

    fn render_front_matter(&self, out: &mut String, doc: &DocumentModel) -> Result<()> {
        writeln!(out, "\\title{{{}}}\n", escape_latex(doc.title.text_or(DEFAULT_TITLE)))?;
        self.render_authors(out, doc)?;

        let keywords = doc.keywords.as_option().map(split_keywords);
        let style = self.profile.keyword_block;

        if self.profile.abstract_before_maketitle {
            self.render_abstract(out, doc, keywords.as_deref())?;
        }
        if let (Some(keywords), KeywordStyle::PreambleCommand) = (&keywords, style) {
            writeln!(out, "\\keywords{{{}}}\n", keywords.join(", "))?;
        }
        out.push_str("\\maketitle\n\n");
        if !self.profile.abstract_before_maketitle {
            self.render_abstract(out, doc, keywords.as_deref())?;
        }
        if let (Some(keywords), KeywordStyle::Environment) = (&keywords, style) {
            writeln!(
                out,
                "\\begin{{IEEEkeywords}}\n{}\n\\end{{IEEEkeywords}}\n",
                keywords.join(", ")
            )?;
        }
        Ok(())
    }

    fn render_authors(&self, out: &mut String, doc: &DocumentModel) -> Result<()> {
        let authors = split_authors(doc.authors.text_or(DEFAULT_AUTHOR));
        let (emails, institutions): (Vec<&String>, Vec<&String>) =
            doc.affiliations.iter().partition(|a| a.contains('@'));

        match self.profile.author_block {
            AuthorBlockStyle::Combined => {
                let names = authors
                    .iter()
                    .map(|a| escape_latex(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                let lines: Vec<String> = institutions
                    .iter()
                    .chain(emails.iter())
                    .map(|a| escape_latex(a))
                    .collect();
                if lines.is_empty() {
                    writeln!(out, "\\author{{\\IEEEauthorblockN{{{}}}}}\n", names)?;
                } else {
                    writeln!(
                        out,
                        "\\author{{\\IEEEauthorblockN{{{}}}\n\\IEEEauthorblockA{{{}}}}}\n",
                        names,
                        lines.join(" \\\\\n")
                    )?;
                }
            }
            AuthorBlockStyle::PerAuthor => {
                for (i, author) in authors.iter().enumerate() {
                    writeln!(out, "\\author{{{}}}", escape_latex(author))?;
                    if let Some(email) = emails.get(i) {
                        writeln!(out, "\\email{{{}}}", escape_latex(email))?;
                    }
                    if let Some(institution) = institutions.get(i).or(institutions.last()) {
                        writeln!(
                            out,
                            "\\affiliation{{\\institution{{{}}}}}",
                            escape_latex(institution)
                        )?;
                    }
                }
                out.push('\n');
            }
            AuthorBlockStyle::Institute => {
                let names = authors
                    .iter()
                    .map(|a| escape_latex(a))
                    .collect::<Vec<_>>()
                    .join(" \\and ");
                writeln!(out, "\\author{{{}}}", names)?;

                let mut entries: Vec<String> =
                    institutions.iter().map(|a| escape_latex(a)).collect();
                if !emails.is_empty() {
                    let mail = emails
                        .iter()
                        .map(|e| format!("\\email{{{}}}", escape_latex(e)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    match entries.last_mut() {
                        Some(last) => {
                            last.push_str(" \\\\\n");
                            last.push_str(&mail);
                        }
                        None => entries.push(mail),
                    }
                }
                if !entries.is_empty() {
                    writeln!(out, "\\institute{{{}}}", entries.join(" \\and\n"))?;
                }
                out.push('\n');
            }
        }
        Ok(())
    }

    fn render_abstract(
        &self,
        out: &mut String,
        doc: &DocumentModel,
        keywords: Option<&[String]>,
    ) -> Result<()> {
        let inline_keywords = keywords
            .filter(|_| self.profile.keyword_block == KeywordStyle::AbstractCommand)
            .map(|k| k.join(" \\and "));

        match doc.abstract_text.as_option() {
            Some(text) => {
                let paragraphs = text
                    .split("\n\n")
                    .map(escape_latex)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                writeln!(out, "\\begin{{abstract}}\n{}", paragraphs)?;
                if let Some(keywords) = inline_keywords {
                    writeln!(out, "\n\\keywords{{{}}}", keywords)?;
                }
                writeln!(out, "\\end{{abstract}}\n")?;
            }
            None => {
                if let Some(keywords) = inline_keywords {
                    writeln!(out, "\\keywords{{{}}}\n", keywords)?;
                }
            }
        }
        Ok(())
    }

    /// Unplaced items per section, in discovery order.
    ///
    /// The result has one slot per section, or a single slot when there are
    /// no sections.
    fn plan_appendix(&self, doc: &DocumentModel) -> Vec<Vec<Item>> {
        let mut tables = HashSet::new();
        let mut equations = HashSet::new();
        for section in &doc.sections {
            for unit in &section.body {
                match unit {
                    ContentUnit::Table(id) => {
                        tables.insert(*id);
                    }
                    ContentUnit::Equation(id) => {
                        equations.insert(*id);
                    }
                    ContentUnit::Text(text) => {
                        for (_, placeholder) in scan_placeholders(text) {
                            match placeholder {
                                PlaceholderRef::Table(id) => tables.insert(id),
                                PlaceholderRef::Equation(id) => equations.insert(id),
                            };
                        }
                    }
                }
            }
        }

        let mut slots = vec![Vec::new(); doc.sections.len().max(1)];

        for table in doc.tables.iter().filter(|t| !tables.contains(&t.id)) {
            let slot = owning_section(&doc.sections, table.line_span().map(|s| s.start));
            slots[slot].push(Item::Table(table.id));
        }

        let mut unplaced: Vec<_> = doc
            .equations
            .iter()
            .filter(|e| !equations.contains(&e.id))
            .collect();
        unplaced.sort_by_key(|e| e.position_key());
        for equation in unplaced {
            let slot = owning_section(&doc.sections, equation.line());
            slots[slot].push(Item::Equation(equation.id));
        }
        slots
    }

    fn render_appended(&mut self, blocks: &mut Vec<Block>, items: &[Item], doc: &DocumentModel) {
        for item in items {
            self.stats.add_appended();
            match *item {
                Item::Table(id) => self.render_table_ref(blocks, id, doc),
                Item::Equation(id) => self.render_equation_ref(blocks, id, doc),
            }
        }
    }

    fn render_unit(&mut self, blocks: &mut Vec<Block>, unit: &ContentUnit, doc: &DocumentModel) {
        match unit {
            ContentUnit::Text(text) => self.render_text(blocks, text, doc),
            ContentUnit::Table(id) => self.render_table_ref(blocks, *id, doc),
            ContentUnit::Equation(id) => self.render_equation_ref(blocks, *id, doc),
        }
    }

    /// Prose with any literal placeholder tokens resolved.
    fn render_text(&mut self, blocks: &mut Vec<Block>, text: &str, doc: &DocumentModel) {
        let mut paragraph = String::new();
        let mut pos = 0;

        for (range, placeholder) in scan_placeholders(text) {
            paragraph.push_str(&escape_latex(&text[pos..range.start]));
            pos = range.end;

            match placeholder {
                PlaceholderRef::Table(id) if doc.table(id).is_some() => {
                    if self.rendered_tables.contains(&id) {
                        write_ref(&mut paragraph, "Table~\\ref{tab:", id, "}");
                    } else {
                        flush_paragraph(blocks, &mut paragraph);
                        self.render_table_ref(blocks, id, doc);
                    }
                }
                PlaceholderRef::Equation(id) if doc.equation(id).is_some() => {
                    if self.rendered_equations.contains(&id) {
                        write_ref(&mut paragraph, "Eq.~\\eqref{eq:", id, "}");
                    } else {
                        flush_paragraph(blocks, &mut paragraph);
                        self.render_equation_ref(blocks, id, doc);
                    }
                }
                dangling => {
                    self.stats.add_dangling();
                    paragraph.push_str(&escape_latex(&dangling.to_string()));
                }
            }
        }
        paragraph.push_str(&escape_latex(&text[pos..]));
        flush_paragraph(blocks, &mut paragraph);
    }

    fn render_table_ref(&mut self, blocks: &mut Vec<Block>, id: usize, doc: &DocumentModel) {
        match doc.table(id) {
            Some(table) if !self.rendered_tables.contains(&id) => {
                self.rendered_tables.insert(id);
                let latex = self.render_table(table);
                blocks.push(Block::Float(latex));
            }
            Some(_) => blocks.push(Block::Paragraph(format!("Table~\\ref{{tab:{}}}", id))),
            None => {
                self.stats.add_dangling();
                blocks.push(Block::Paragraph(escape_latex(
                    &PlaceholderRef::Table(id).to_string(),
                )));
            }
        }
    }

    fn render_equation_ref(&mut self, blocks: &mut Vec<Block>, id: usize, doc: &DocumentModel) {
        match doc.equation(id) {
            Some(equation) if !self.rendered_equations.contains(&id) => {
                self.rendered_equations.insert(id);
                self.stats.add_equation();
                let body = if equation.canonical_form.trim().is_empty() {
                    equation.raw_content.trim()
                } else {
                    equation.canonical_form.trim()
                };
                let body = match equation.method {
                    DetectionMethod::DisplayDelimiter
                    | DetectionMethod::InlineDelimiter
                    | DetectionMethod::ControlSequence => body.to_string(),
                    _ => escape_math_specials(body),
                };
                blocks.push(Block::Display(format!(
                    "\\begin{{equation}}\n{}\n\\label{{{}}}\n\\end{{equation}}",
                    body,
                    equation.label()
                )));
            }
            Some(_) => blocks.push(Block::Paragraph(format!("Eq.~\\eqref{{eq:{}}}", id))),
            None => {
                self.stats.add_dangling();
                blocks.push(Block::Paragraph(escape_latex(
                    &PlaceholderRef::Equation(id).to_string(),
                )));
            }
        }
    }

    /// Render one table float with its optimized layout.
    pub fn render_table(&mut self, table: &Table) -> String {
        let layout = optimize_table(table, &self.profile);
        let level = if self.options.abbreviate {
            layout.abbreviation
        } else {
            AbbreviationLevel::None
        };

        self.stats.add_table();
        if level > AbbreviationLevel::None {
            self.stats.abbreviated_tables += 1;
        }
        if layout.environment == TableEnvironment::Spanning {
            self.stats.spanning_tables += 1;
        }

        let rules = self.profile.borders == BorderStyle::Rules;
        let columns: Vec<String> = layout
            .widths
            .iter()
            .map(|w| format!(">{{\\raggedright\\arraybackslash}}p{{{:.3}\\linewidth}}", w))
            .collect();
        let spec = if rules {
            columns.concat()
        } else {
            format!("|{}|", columns.join("|"))
        };
        let (top, mid, bottom) = if rules {
            ("\\toprule", "\\midrule", "\\bottomrule")
        } else {
            ("\\hline", "\\hline", "\\hline")
        };

        let env = layout.environment.name();
        let placement = match layout.environment {
            TableEnvironment::SingleColumn => "htbp",
            TableEnvironment::Spanning => "tbp",
        };

        let mut out = String::new();
        out.push_str(&format!("\\begin{{{}}}[{}]\n\\centering\n", env, placement));
        out.push_str(&format!("\\caption{{{}}}\n", escape_latex(&table.caption)));
        out.push_str(&format!("\\label{{{}}}\n", table.label));
        out.push_str(layout.font.command());
        out.push('\n');
        out.push_str(&format!(
            "\\setlength{{\\tabcolsep}}{{{}pt}}\n\\renewcommand{{\\arraystretch}}{{{}}}\n",
            layout.spacing.column_separation_pt(),
            layout.spacing.array_stretch()
        ));
        out.push_str(&format!("\\begin{{tabular}}{{{}}}\n{}\n", spec, top));

        let column_count = layout.widths.len();
        for (i, row) in table.grid.iter().enumerate() {
            let header = table.has_header_row && i == 0;
            let cells: Vec<String> = (0..column_count)
                .map(|c| {
                    let text = row.get(c).map(String::as_str).unwrap_or("");
                    let cell = self
                        .abbreviator
                        .abbreviate_cell(text, level)
                        .iter()
                        .map(|line| escape_latex(line))
                        .collect::<Vec<_>>()
                        .join(" \\newline ");
                    if header && !cell.is_empty() {
                        format!("\\textbf{{{}}}", cell)
                    } else {
                        cell
                    }
                })
                .collect();
            out.push_str(&cells.join(" & "));
            out.push_str(" \\\\\n");
            if header && table.grid.len() > 1 {
                out.push_str(mid);
                out.push('\n');
            }
        }

        out.push_str(&format!("{}\n\\end{{tabular}}\n\\end{{{}}}", bottom, env));
        out
    }

    fn render_bibliography(&mut self, out: &mut String, section: &Section) -> Result<()> {
        let text = section.plain_text();
        let entries = self.split_references(&text);
        if entries.is_empty() {
            if self.options.bibliography_stub {
                writeln!(out, "\\bibliographystyle{{{}}}", self.profile.bibliography_style)?;
                writeln!(out, "\\bibliography{{references}}\n")?;
            }
            return Ok(());
        }

        self.stats.bibliography_entries = entries.len() as u32;
        writeln!(out, "\\begin{{thebibliography}}{{{}}}", entries.len())?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(out, "\\bibitem{{b{}}} {}", i + 1, escape_latex(entry))?;
        }
        writeln!(out, "\\end{{thebibliography}}\n")?;
        Ok(())
    }

    /// Split a references body into entries on citation markers.
    ///
    /// `[n]` markers take precedence, then `n.` at line start; without
    /// markers every line is one entry.
    pub fn split_references(&self, text: &str) -> Vec<String> {
        let marker = if self.bracket_citation.is_match(text) {
            Some(&self.bracket_citation)
        } else if self.numbered_citation.is_match(text) {
            Some(&self.numbered_citation)
        } else {
            None
        };

        let pieces: Vec<String> = match marker {
            Some(re) => {
                let mut pieces = Vec::new();
                let mut last = 0;
                for m in re.find_iter(text) {
                    pieces.push(text[last..m.start()].to_string());
                    last = m.end();
                }
                pieces.push(text[last..].to_string());
                pieces
            }
            None => text.lines().map(str::to_string).collect(),
        };

        pieces
            .iter()
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Heading command for a section level, and whether it is starred.
fn heading_command(section: &Section) -> (&'static str, bool) {
    let command = match section.level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        _ => "paragraph",
    };
    let starred = section.kind == SectionKind::Unnumbered && section.level <= 3;
    (command, starred)
}

/// Slot for an unplaced item whose source starts at `line`.
///
/// Lines before the first heading belong to the first section; items
/// without a line go to the last one. References sections hand their items
/// to the closest preceding section.
fn owning_section(sections: &[Section], line: Option<usize>) -> usize {
    if sections.is_empty() {
        return 0;
    }
    let last = sections.len() - 1;
    let idx = match line {
        Some(line) => sections
            .iter()
            .rposition(|s| s.span.start <= line)
            .unwrap_or(0),
        None => last,
    };
    (0..=idx)
        .rev()
        .find(|&i| !sections[i].is_references())
        .unwrap_or(idx)
}

fn split_authors(text: &str) -> Vec<String> {
    let authors: Vec<String> = text
        .split([',', ';', '&'])
        .flat_map(|part| part.split(" and "))
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if authors.is_empty() {
        vec![DEFAULT_AUTHOR.to_string()]
    } else {
        authors
    }
}

fn split_keywords(text: &str) -> Vec<String> {
    text.split([',', ';'])
        .map(|k| escape_latex(k.trim()))
        .filter(|k| !k.is_empty())
        .collect()
}

fn write_ref(out: &mut String, prefix: &str, id: usize, suffix: &str) {
    out.push_str(prefix);
    out.push_str(&id.to_string());
    out.push_str(suffix);
}

fn flush_paragraph(blocks: &mut Vec<Block>, paragraph: &mut String) {
    let text = paragraph.trim();
    if !text.is_empty() {
        blocks.push(Block::Paragraph(text.to_string()));
    }
    paragraph.clear();
}

/// Join body blocks: blank lines between paragraphs and around floats,
/// a single newline between prose and a display equation.
fn push_blocks(out: &mut String, blocks: Vec<Block>) {
    let mut previous: Option<&Block> = None;
    for block in &blocks {
        if let Some(prev) = previous {
            let tight = matches!(
                (prev, block),
                (Block::Paragraph(_), Block::Display(_))
                    | (Block::Display(_), Block::Paragraph(_))
                    | (Block::Display(_), Block::Display(_))
            );
            out.push_str(if tight { "\n" } else { "\n\n" });
        }
        match block {
            Block::Paragraph(text) | Block::Display(text) | Block::Float(text) => {
                out.push_str(text)
            }
        }
        previous = Some(block);
    }
    if !blocks.is_empty() {
        out.push_str("\n\n");
    }
}

/// Escape characters that end or misalign an equation body when they
/// were not written as LaTeX by the author.
fn escape_math_specials(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        if matches!(c, '%' | '#' | '&') && !escaped {
            result.push('\\');
        }
        escaped = c == '\\' && !escaped;
        result.push(c);
    }
    result
}

/// Escape LaTeX special characters in prose.
pub fn escape_latex(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                result.push('\\');
                result.push(c);
            }
            '^' => result.push_str("\\^{}"),
            '~' => result.push_str("\\~{}"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DetectedElement, DetectionMethod, Equation, EquationSource, LineSpan, SectionKind,
        TableSource,
    };
    use crate::render::TemplateKind;

    fn doc_with_table() -> DocumentModel {
        let mut doc = DocumentModel::new();
        doc.title = DetectedElement::detected("Paper Title", 0.9, "first line", 0);
        doc.authors = DetectedElement::detected("J. Doe", 0.8, "after title", 1);
        doc.tables.push(Table::new(
            1,
            vec![
                vec!["A".into(), "B".into()],
                vec!["1".into(), "2".into()],
            ],
            TableSource::Fenced(LineSpan::new(2, 5)),
        ));
        let mut section = Section::new("1.", "Results", 1, SectionKind::Arabic, 6);
        section.body.push(ContentUnit::Table(1));
        section.push_text("[see table]");
        doc.sections.push(section);
        doc
    }

    fn equation(id: usize, line: Option<usize>) -> Equation {
        let source = match line {
            Some(line) => EquationSource::Text {
                line,
                start: 0,
                end: 5,
            },
            None => EquationSource::Fragment { index: 0 },
        };
        Equation {
            id,
            raw_content: "$x^2$".into(),
            canonical_form: "x^2".into(),
            method: DetectionMethod::InlineDelimiter,
            confidence: 0.85,
            source,
            surrounding_context: String::new(),
            trigger: None,
        }
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("50% of R&D_x"), "50\\% of R\\&D\\_x");
        assert_eq!(escape_latex("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape_latex("~^"), "\\~{}\\^{}");
    }

    #[test]
    fn test_render_ieee_document() {
        let latex = to_latex(&doc_with_table(), &RenderOptions::default()).unwrap();

        assert!(latex.starts_with("\\documentclass[conference]{IEEEtran}"));
        assert!(latex.contains("\\title{Paper Title}"));
        assert!(latex.contains("\\IEEEauthorblockN{J. Doe}"));
        assert!(latex.contains("\\section{Results}"));
        assert!(latex.contains("\\begin{tabular}"));
        assert!(latex.contains("A & B \\\\"));
        assert!(latex.contains("1 & 2 \\\\"));
        assert!(latex.contains("\\bibliographystyle{IEEEtran}"));
        assert!(latex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_templates_differ() {
        let doc = doc_with_table();
        let acm = to_latex(&doc, &RenderOptions::new().with_template(TemplateKind::Acm)).unwrap();
        let springer =
            to_latex(&doc, &RenderOptions::new().with_template(TemplateKind::Springer)).unwrap();

        assert!(acm.contains("\\documentclass[sigconf]{acmart}"));
        assert!(acm.contains("\\toprule"));
        assert!(springer.contains("{llncs}"));
        assert!(springer.contains("\\hline"));
        assert!(springer.contains("\\author{J. Doe}"));
    }

    #[test]
    fn test_defaults_for_missing_front_matter() {
        let latex = to_latex(&DocumentModel::new(), &RenderOptions::default()).unwrap();
        assert!(latex.contains("\\title{Untitled Document}"));
        assert!(latex.contains("Anonymous"));
        assert!(!latex.contains("\\begin{abstract}"));
    }

    #[test]
    fn test_heading_levels() {
        let mut doc = DocumentModel::new();
        for (i, level) in [1u8, 2, 3, 4].iter().enumerate() {
            doc.sections.push(Section::new(
                format!("{}", i),
                format!("Level {}", level),
                *level,
                SectionKind::Arabic,
                i,
            ));
        }
        let latex = to_latex(&doc, &RenderOptions::default()).unwrap();
        assert!(latex.contains("\\section{Level 1}"));
        assert!(latex.contains("\\subsection{Level 2}"));
        assert!(latex.contains("\\subsubsection{Level 3}"));
        assert!(latex.contains("\\paragraph{Level 4}"));
    }

    #[test]
    fn test_dangling_placeholders_render_literally() {
        let mut doc = DocumentModel::new();
        let mut section = Section::new("1.", "Intro", 1, SectionKind::Arabic, 0);
        section.body.push(ContentUnit::Equation(9));
        section.push_text("see [TABLE_4] here");
        doc.sections.push(section);

        let result = to_latex_with_stats(&doc, &RenderOptions::default()).unwrap();
        assert!(result.content.contains("[EQUATION\\_9]"));
        assert!(result.content.contains("see [TABLE\\_4] here"));
        assert_eq!(result.stats.dangling_count, 2);
    }

    #[test]
    fn test_equation_environment_and_appendix() {
        let mut doc = DocumentModel::new();
        let mut intro = Section::new("1.", "Intro", 1, SectionKind::Arabic, 0);
        intro.span = LineSpan::new(0, 3);
        intro.push_text("The result is");
        intro.body.push(ContentUnit::Equation(1));
        let method = Section::new("2.", "Method", 1, SectionKind::Arabic, 4);
        doc.sections.push(intro);
        doc.sections.push(method);
        doc.equations.push(equation(1, Some(1)));
        doc.equations.push(equation(2, Some(2)));
        doc.equations.push(equation(3, None));

        let result = to_latex_with_stats(&doc, &RenderOptions::default()).unwrap();
        let latex = &result.content;
        assert!(latex.contains("The result is\n\\begin{equation}\nx^2\n\\label{eq:1}\n\\end{equation}"));

        // eq:2 is appended after Intro, eq:3 has no line and goes last.
        let eq2 = latex.find("\\label{eq:2}").unwrap();
        let eq3 = latex.find("\\label{eq:3}").unwrap();
        let method_heading = latex.find("\\section{Method}").unwrap();
        assert!(eq2 < method_heading);
        assert!(eq3 > method_heading);
        assert_eq!(result.stats.appended_count, 2);
        assert_eq!(result.stats.equation_count, 3);
    }

    #[test]
    fn test_equation_specials_escaped_outside_author_latex() {
        let mut doc = DocumentModel::new();
        let mut section = Section::new("1.", "Intro", 1, SectionKind::Arabic, 0);
        section.body.push(ContentUnit::Equation(1));
        section.body.push(ContentUnit::Equation(2));
        doc.sections.push(section);

        let mut flattened = equation(1, None);
        flattened.method = DetectionMethod::MarkupFlattened;
        flattened.canonical_form = "r = 50% # n & m".into();
        let mut inline = equation(2, Some(0));
        inline.canonical_form = "a \\% b".into();
        doc.equations.push(flattened);
        doc.equations.push(inline);

        let latex = to_latex(&doc, &RenderOptions::default()).unwrap();
        assert!(latex.contains("\\begin{equation}\nr = 50\\% \\# n \\& m\n\\label{eq:1}"));
        assert!(latex.contains("\\begin{equation}\na \\% b\n\\label{eq:2}"));
        assert_eq!(escape_math_specials("\\% and %"), "\\% and \\%");
    }

    #[test]
    fn test_bibliography_from_references_section() {
        let mut doc = DocumentModel::new();
        let mut refs = Section::new("", "References", 1, SectionKind::Unnumbered, 5);
        refs.push_text("[1] A. Author, First paper, 2020.");
        refs.push_text("[2] B. Writer, Second paper, 2021.");
        doc.sections.push(refs);

        let result = to_latex_with_stats(&doc, &RenderOptions::default()).unwrap();
        assert!(result.content.contains("\\begin{thebibliography}{2}"));
        assert!(result.content.contains("\\bibitem{b1} A. Author, First paper, 2020."));
        assert!(result.content.contains("\\bibitem{b2} B. Writer, Second paper, 2021."));
        assert!(!result.content.contains("\\bibliographystyle"));
        assert!(!result.content.contains("\\section{References}"));
        assert_eq!(result.stats.bibliography_entries, 2);
        assert_eq!(result.stats.section_count, 0);
    }

    #[test]
    fn test_split_references() {
        let renderer = LatexRenderer::new(RenderOptions::default());
        assert_eq!(
            renderer.split_references("1. First entry.\n2. Second\nentry continued."),
            vec!["First entry.", "Second entry continued."]
        );
        assert_eq!(
            renderer.split_references("Plain one\nPlain two"),
            vec!["Plain one", "Plain two"]
        );
    }

    #[test]
    fn test_stub_can_be_disabled() {
        let latex = to_latex(
            &DocumentModel::new(),
            &RenderOptions::new().with_bibliography_stub(false),
        )
        .unwrap();
        assert!(!latex.contains("\\bibliography{"));
    }

    #[test]
    fn test_authors_and_affiliations_per_author() {
        let mut doc = DocumentModel::new();
        doc.authors = DetectedElement::detected("A. Author and B. Writer", 0.9, "", 1);
        doc.affiliations = vec!["Example University".into(), "a@example.edu".into()];

        let latex =
            to_latex(&doc, &RenderOptions::new().with_template(TemplateKind::Acm)).unwrap();
        assert!(latex.contains("\\author{A. Author}\n\\email{a@example.edu}"));
        assert!(latex.contains("\\author{B. Writer}\n\\affiliation{\\institution{Example University}}"));
    }
}
