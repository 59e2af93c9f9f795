//! Integration tests for input adapters and the adapter registry.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use papertex::convert::{self, AdapterRegistry, HtmlAdapter, InputAdapter, SourceBundle, TextAdapter};
use papertex::error::{Error, Result};
use papertex::model::ContentUnit;
use papertex::{parse_file, Config, ManuscriptParser, Papertex, TemplateKind};

/// Mock adapter for testing.
struct MockAdapter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockAdapter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl InputAdapter for MockAdapter {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn load_bytes(&self, _bytes: &[u8]) -> Result<SourceBundle> {
        Ok(SourceBundle::new(format!("Loaded by {}", self.name)))
    }
}

#[test]
fn test_registry_new_is_empty() {
    let registry = AdapterRegistry::new();

    assert!(!registry.supports("txt"));
    assert!(!registry.supports("html"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_registry_with_defaults() {
    let registry = AdapterRegistry::with_defaults();

    assert!(registry.supports("txt"));
    assert!(registry.supports("TXT"));
    assert!(registry.supports("htm"));
    assert!(!registry.supports("docx"));
    assert!(!registry.supports("pdf"));
}

#[test]
fn test_registry_register() {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(MockAdapter::new(vec!["tex", "ltx"], "latex")));

    assert!(registry.supports("tex"));
    assert!(registry.supports("LTX"));

    let adapter = registry.get_by_name("LaTeX").unwrap();
    assert!(adapter.supports_extension("tex"));

    let bundle = registry.load_bytes(b"ignored", "ltx").unwrap();
    assert_eq!(bundle.raw_text, "Loaded by latex");
}

#[test]
fn test_registry_multiple_adapters() {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(TextAdapter::new()));
    registry.register(Arc::new(HtmlAdapter::new()));
    registry.register(Arc::new(MockAdapter::new(vec!["rtf"], "rtf")));

    assert_eq!(registry.get_by_extension("md").unwrap().name(), "text");
    assert_eq!(registry.get_by_extension("xhtml").unwrap().name(), "html");
    assert_eq!(registry.get_by_extension("rtf").unwrap().name(), "rtf");
    assert!(registry.get_by_name("unknown").is_none());
}

#[test]
fn test_load_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.txt");
    fs::write(&path, "\u{FEFF}Paper Title\nJ. Doe\n1. Introduction\nSome text.").unwrap();

    let bundle = convert::load(&path, None).unwrap();
    assert!(bundle.raw_text.starts_with("Paper Title"));
    assert!(bundle.html.is_none());
    assert!(bundle.math_fragments.is_empty());
}

#[test]
fn test_load_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.html");
    fs::write(
        &path,
        "<html><body><h1>A Title</h1><p>J. Doe</p><p>1. Introduction</p></body></html>",
    )
    .unwrap();

    let bundle = convert::load(&path, None).unwrap();
    assert_eq!(bundle.raw_text, "A Title\nJ. Doe\n1. Introduction");
    assert!(bundle.html.is_some());
}

#[test]
fn test_html_table_is_placed_in_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.html");
    fs::write(
        &path,
        "<html><body><h1>Paper Title</h1><p>J. Doe</p><p>1. Results</p>\
         <p>Our scores are below.</p>\
         <table><tr><th>Model</th><th>F1</th></tr><tr><td>Baseline</td><td>0.71</td></tr></table>\
         <p>More text follows here.</p></body></html>",
    )
    .unwrap();

    let bundle = convert::load(&path, None).unwrap();
    let doc = ManuscriptParser::new().parse(&bundle);

    assert_eq!(doc.tables.len(), 1);
    let table = &doc.tables[0];
    assert!(table.has_header_row);
    assert_eq!(table.grid, vec![vec!["Model", "F1"], vec!["Baseline", "0.71"]]);

    assert_eq!(doc.sections.len(), 1);
    let section = &doc.sections[0];
    assert_eq!(section.title, "Results");
    assert_eq!(
        section.body,
        vec![
            ContentUnit::Text("Our scores are below.".to_string()),
            ContentUnit::Table(1),
            ContentUnit::Text("More text follows here.".to_string()),
        ]
    );
    assert!(section.body_text().contains("[TABLE_1]"));
}

#[test]
fn test_load_with_math_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.txt");
    fs::write(&path, "Paper Title\n1. Model\nWe use the following equation.").unwrap();

    let math = dir.path().join("math");
    fs::create_dir(&math).unwrap();
    fs::write(math.join("eq2.xml"), "<math><mi>b</mi></math>").unwrap();
    fs::write(math.join("eq1.xml"), "<math><mi>L</mi><mo>=</mo><mn>0</mn></math>").unwrap();
    fs::write(math.join("notes.txt"), "ignored").unwrap();

    let bundle = convert::load(&path, Some(&math)).unwrap();
    assert_eq!(bundle.math_fragments.len(), 2);
    assert!(bundle.math_fragments[0].contains("<mi>L</mi>"));
}

#[test]
fn test_load_missing_math_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.txt");
    fs::write(&path, "Paper Title").unwrap();

    let result = convert::load(&path, Some(&dir.path().join("missing")));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_load_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.docx");
    fs::write(&path, "PK\x03\x04").unwrap();

    let result = convert::load(&path, None);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_load_archive_disguised_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.txt");
    fs::write(&path, b"PK\x03\x04\x14\x00").unwrap();

    let result = convert::load(&path, None);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_load_missing_file() {
    let result = convert::load(Path::new("/nonexistent/paper.txt"), None);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_load_without_extension_is_sniffed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manuscript");
    fs::write(&path, "<!DOCTYPE html><html><body><p>Sniffed Title</p></body></html>").unwrap();

    let bundle = AdapterRegistry::with_defaults().load(&path).unwrap();
    assert_eq!(bundle.raw_text, "Sniffed Title");
    assert!(bundle.html.is_some());
}

#[test]
fn test_parse_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.md");
    fs::write(&path, "Paper Title\nJ. Doe\nAbstract: We study X.\n1. Introduction\nSome text.")
        .unwrap();

    let doc = parse_file(&path).unwrap();
    assert_eq!(doc.title.text, "Paper Title");
    assert_eq!(doc.sections.len(), 1);
}

#[test]
fn test_builder_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("papertex.json");
    fs::write(&config_path, r#"{"render": {"template": "springer", "bibliography_stub": false}}"#)
        .unwrap();
    let paper = dir.path().join("paper.txt");
    fs::write(&paper, "Paper Title\nJ. Doe\n1. Introduction\nSome text.").unwrap();

    let config = Config::from_path(&config_path).unwrap();
    assert_eq!(config.render.template, TemplateKind::Springer);

    let latex = Papertex::new()
        .with_config(config)
        .parse(&paper)
        .unwrap()
        .to_latex()
        .unwrap();
    assert!(latex.contains("llncs"));
    assert!(!latex.contains("\\bibliographystyle"));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_load_async_joins_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.txt");
    fs::write(&path, "Paper Title\n1. Model\nText.").unwrap();
    let math = dir.path().join("math");
    fs::create_dir(&math).unwrap();
    fs::write(math.join("b.xml"), "<math><mi>b</mi></math>").unwrap();
    fs::write(math.join("a.xml"), "<math><mi>a</mi></math>").unwrap();

    let bundle = convert::load_async(&path, Some(&math)).await.unwrap();
    assert_eq!(bundle.raw_text, "Paper Title\n1. Model\nText.");
    assert_eq!(bundle.math_fragments.len(), 2);
    assert!(bundle.math_fragments[0].contains("<mi>a</mi>"));
}
