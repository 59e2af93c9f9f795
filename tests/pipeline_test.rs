//! Integration tests for structure recovery.

use papertex::model::{CaptionSource, ContentUnit, DetectionMethod, SectionKind};
use papertex::render::{self, optimize_table, RenderOptions, TemplateProfile};
use papertex::{parse_text, ManuscriptParser, Papertex, ParseOptions, SourceBundle, TemplateKind};

#[test]
fn test_front_matter_and_single_section() {
    let doc = parse_text(
        "Paper Title\nJ. Doe\nAbstract: We study X.\nKeywords: x, y\n1. Introduction\nSome text.",
    );

    assert_eq!(doc.title.text, "Paper Title");
    assert_eq!(doc.authors.text, "J. Doe");
    assert_eq!(doc.abstract_text.text, "We study X.");
    assert_eq!(doc.keywords.text, "x, y");

    assert_eq!(doc.sections.len(), 1);
    let section = &doc.sections[0];
    assert_eq!(section.number, "1.");
    assert_eq!(section.title, "Introduction");
    assert_eq!(section.level, 1);
    assert_eq!(section.body, vec![ContentUnit::Text("Some text.".to_string())]);
}

#[test]
fn test_fenced_table_before_heading() {
    let doc = parse_text("||====||\n||A|B||\n||1|2||\n||====||\n1. Results\n[see table]");

    assert_eq!(doc.tables.len(), 1);
    assert_eq!(doc.tables[0].grid, vec![vec!["A", "B"], vec!["1", "2"]]);

    assert_eq!(doc.sections.len(), 1);
    let section = &doc.sections[0];
    assert_eq!(section.title, "Results");
    assert!(section.body.contains(&ContentUnit::Table(1)));
    assert!(section.body_text().contains("[TABLE_1]"));
    assert!(!doc.title.is_detected());
}

#[test]
fn test_subsection_levels_in_order() {
    let doc = parse_text("2. Approach\nText.\n2.1 Method\nMore text.");

    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[0].title, "Approach");
    assert_eq!(doc.sections[0].level, 1);
    assert_eq!(doc.sections[1].title, "Method");
    assert_eq!(doc.sections[1].number, "2.1");
    assert_eq!(doc.sections[1].level, 2);
    assert!(doc.sections[0].span.end < doc.sections[1].span.start);
}

#[test]
fn test_inline_equation_in_body() {
    let doc = parse_text("Paper Title\n1. Intro\nThe result is $x^2+1$ here.");

    assert_eq!(doc.equations.len(), 1);
    let eq = &doc.equations[0];
    assert_eq!(eq.canonical_form, "x^2+1");
    assert!(eq.confidence > ParseOptions::default().equations.min_confidence);

    assert_eq!(
        doc.sections[0].body,
        vec![
            ContentUnit::Text("The result is".to_string()),
            ContentUnit::Equation(1),
            ContentUnit::Text("here.".to_string()),
        ]
    );
}

#[test]
fn test_fragment_duplicate_replaces_delimited_span() {
    let fragment = "<m:oMath><m:sSup><m:e><m:r><m:t>x</m:t></m:r></m:e>\
                    <m:sup><m:r><m:t>2</m:t></m:r></m:sup></m:sSup>\
                    <m:r><m:t>+1</m:t></m:r></m:oMath>";
    let bundle = SourceBundle::new("Paper Title\n1. Intro\nThe result is $x^2+1$ here.")
        .with_fragment(fragment);
    let doc = ManuscriptParser::new().parse(&bundle);

    assert_eq!(doc.equations.len(), 1);
    assert_eq!(doc.equations[0].method, DetectionMethod::Markup);
    assert_eq!(
        doc.sections[0].body,
        vec![
            ContentUnit::Text("The result is".to_string()),
            ContentUnit::Equation(1),
            ContentUnit::Text("here.".to_string()),
        ]
    );

    let latex = render::to_latex(&doc, &RenderOptions::default()).unwrap();
    assert!(!latex.contains("\\$"));
}

#[test]
fn test_numbered_bibliography_stays_in_references() {
    let doc = parse_text(
        "Paper Title\n\
         1. Intro\n\
         Text here.\n\
         References\n\
         1. A. Author, First paper, 2020.\n\
         2. B. Writer, Second paper, 2021.",
    );

    let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Intro", "References"]);
    assert!(doc.sections[1].is_references());

    let result = render::to_latex_with_stats(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(result.stats.bibliography_entries, 2);
    assert!(result
        .content
        .contains("\\bibitem{b1} A. Author, First paper, 2020."));
    assert!(result
        .content
        .contains("\\bibitem{b2} B. Writer, Second paper, 2021."));
}

#[test]
fn test_caption_row_removed_from_grid() {
    let doc = parse_text(
        "Paper Title\n\
         ||====||\n\
         Performance comparison of methods\n\
         ||Performance comparison of methods||\n\
         ||Method|Accuracy||\n\
         ||Ours|91.2||\n\
         ||====||\n\
         1. Results\n\
         Text.",
    );

    let table = &doc.tables[0];
    assert_eq!(table.caption, "Performance comparison of methods");
    assert_eq!(table.caption_source, CaptionSource::Internal);
    assert_eq!(table.grid, vec![vec!["Method", "Accuracy"], vec!["Ours", "91.2"]]);
}

#[test]
fn test_levels_follow_numbering() {
    let doc = parse_text(
        "Paper Title\n\
         1. Intro\n\
         Text.\n\
         1.1 Background\n\
         Text.\n\
         1.1.1 Details\n\
         Text.\n\
         II. RELATED WORK\n\
         Text.",
    );

    assert_eq!(doc.sections.len(), 4);
    for section in &doc.sections {
        assert!(section.level >= 1);
        match section.kind {
            SectionKind::Arabic => {
                let separators = section.number.trim_end_matches('.').matches('.').count();
                assert_eq!(section.level as usize, separators + 1, "{}", section.number);
            }
            SectionKind::Roman => assert_eq!(section.level, 1),
            SectionKind::Unnumbered => {}
        }
    }
    assert_eq!(doc.sections[3].kind, SectionKind::Roman);
}

#[test]
fn test_table_cell_text_never_becomes_heading() {
    let doc = parse_text(
        "Paper Title\n\
         ||====||\n\
         ||2. Results|3. Discussion||\n\
         ||x|y||\n\
         ||====||\n\
         2. Results\n\
         1. Introduction\n\
         Body text.",
    );

    let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Introduction"]);
}

#[test]
fn test_dangling_placeholders_are_kept() {
    let doc = parse_text("Paper Title\n1. Intro\nSee [TABLE_9] and [EQUATION_4] here.");

    assert_eq!(doc.dangling_placeholders().len(), 2);
    let result = Papertex::new()
        .parse_text("Paper Title\n1. Intro\nSee [TABLE_9] and [EQUATION_4] here.")
        .to_latex_with_stats()
        .unwrap();
    assert_eq!(result.stats.dangling_count, 2);
    assert!(result.content.contains("[TABLE\\_9]"));
    assert!(result.content.contains("[EQUATION\\_4]"));
}

#[test]
fn test_layout_is_idempotent_for_parsed_tables() {
    let doc = parse_text(
        "||====||\n\
         ||Method|Description of the training procedure|Accuracy||\n\
         ||Baseline|Standard cross entropy with early stopping|0.81||\n\
         ||====||",
    );
    let table = &doc.tables[0];

    for kind in TemplateKind::ALL {
        let profile = TemplateProfile::from_kind(kind);
        assert_eq!(optimize_table(table, &profile), optimize_table(table, &profile));
    }
}

#[test]
fn test_no_headings_gives_fallback_section() {
    let doc = parse_text(
        "A Short Note on Tables\n\
         J. Doe\n\
         This note has no numbered headings at all, but it carries enough text to keep.",
    );

    assert_eq!(doc.authors.text, "J. Doe");
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections[0].kind, SectionKind::Unnumbered);
}

#[test]
fn test_empty_input_is_empty_model() {
    let doc = parse_text("   \n\n");
    assert!(doc.is_empty());
    assert!(!doc.title.is_detected());
    assert!(!doc.abstract_text.reasoning.is_empty());
}
