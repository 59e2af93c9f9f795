//! papertex CLI - manuscript to LaTeX conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use papertex::model::DetectedElement;
use papertex::render::{self, TemplateProfile};
use papertex::{convert, Config, JsonFormat, ManuscriptParser, SourceBundle, TemplateKind};

#[derive(Parser)]
#[command(name = "papertex")]
#[command(version)]
#[command(about = "Convert academic manuscripts to IEEE, ACM and Springer LaTeX", long_about = None)]
struct Cli {
    /// Input manuscript (text or HTML)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Target template
    #[arg(short, long, value_enum)]
    template: Option<Template>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a manuscript to LaTeX
    #[command(alias = "tex")]
    Convert {
        /// Input manuscript (text or HTML)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target template
        #[arg(short, long, value_enum, env = "PAPERTEX_TEMPLATE")]
        template: Option<Template>,

        /// Directory of OMML/MathML fragments (*.xml)
        #[arg(long, value_name = "DIR")]
        math_dir: Option<PathBuf>,

        /// JSON configuration file with parse and render options
        #[arg(long, value_name = "JSON")]
        config: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Keep table cells unabbreviated
        #[arg(long)]
        no_abbreviate: bool,
    },

    /// Show the recovered structure with confidence and reasoning
    Inspect {
        /// Input manuscript (text or HTML)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory of OMML/MathML fragments (*.xml)
        #[arg(long, value_name = "DIR")]
        math_dir: Option<PathBuf>,
    },

    /// Dump the document model as JSON
    Json {
        /// Input manuscript (text or HTML)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory of OMML/MathML fragments (*.xml)
        #[arg(long, value_name = "DIR")]
        math_dir: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Emit the outline summary instead of the full model
        #[arg(long)]
        summary: bool,
    },

    /// List the available templates
    Templates,

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Template {
    /// IEEE conference (IEEEtran)
    Ieee,
    /// ACM SIG proceedings (acmart)
    Acm,
    /// Springer LNCS (llncs)
    Springer,
}

impl From<Template> for TemplateKind {
    fn from(template: Template) -> Self {
        match template {
            Template::Ieee => TemplateKind::Ieee,
            Template::Acm => TemplateKind::Acm,
            Template::Springer => TemplateKind::Springer,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            template,
            math_dir,
            config,
            output,
            no_abbreviate,
        }) => cmd_convert(
            &input,
            template,
            math_dir.as_deref(),
            config.as_deref(),
            output.as_deref(),
            no_abbreviate,
        ),
        Some(Commands::Inspect { input, math_dir }) => cmd_inspect(&input, math_dir.as_deref()),
        Some(Commands::Json {
            input,
            math_dir,
            output,
            compact,
            summary,
        }) => cmd_json(
            &input,
            math_dir.as_deref(),
            output.as_deref(),
            compact,
            summary,
        ),
        Some(Commands::Templates) => {
            cmd_templates();
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.template, None, None, None, false)
            } else {
                println!("{}", "Usage: papertex <FILE> [--template ieee|acm|springer]".yellow());
                println!("       papertex --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    template: Option<Template>,
    math_dir: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
    no_abbreviate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            Config::from_path(path)?
        }
        None => Config::default(),
    };
    let mut render_options = config.render;
    if let Some(template) = template {
        render_options = render_options.with_template(template.into());
    }
    if no_abbreviate {
        render_options = render_options.with_abbreviation(false);
    }

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Loading manuscript...");
    let bundle = convert::load(input, math_dir)?;
    log_bundle(input, &bundle);
    pb.inc(1);

    pb.set_message("Recovering structure...");
    let doc = ManuscriptParser::with_options(config.parse).parse(&bundle);
    pb.inc(1);

    pb.set_message(format!("Typesetting for {}...", render_options.template));
    let result = render::to_latex_with_stats(&doc, &render_options)?;
    pb.inc(1);
    pb.finish_and_clear();

    if result.stats.dangling_count > 0 {
        log::warn!(
            "{} placeholders did not resolve and were written literally",
            result.stats.dangling_count
        );
    }

    match output {
        Some(path) => {
            fs::write(path, &result.content)?;
            let stats = &result.stats;
            println!("{} {}", "Saved to".green(), path.display());
            println!(
                "  {} {} sections, {} tables, {} equations",
                "├─".dimmed(),
                stats.section_count,
                stats.table_count,
                stats.equation_count
            );
            println!(
                "  {} {} appended, {} bibliography entries",
                "├─".dimmed(),
                stats.appended_count,
                stats.bibliography_entries
            );
            let dangling = format!("{} dangling placeholders", stats.dangling_count);
            if stats.dangling_count > 0 {
                println!("  {} {}", "└─".dimmed(), dangling.yellow());
            } else {
                println!("  {} {}", "└─".dimmed(), dangling);
            }
        }
        None => println!("{}", result.content),
    }

    Ok(())
}

fn log_bundle(input: &Path, bundle: &SourceBundle) {
    log::info!(
        "Loaded {} ({} bytes of text, {} math fragments, html: {})",
        input.display(),
        bundle.raw_text.len(),
        bundle.math_fragments.len(),
        bundle.html.is_some()
    );
}

fn cmd_inspect(input: &Path, math_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = convert::load(input, math_dir)?;
    log_bundle(input, &bundle);
    let doc = ManuscriptParser::new().parse(&bundle);

    println!("{}", "Front Matter".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_element("Title", &doc.title);
    print_element("Authors", &doc.authors);
    for affiliation in &doc.affiliations {
        println!("{}: {}", "Affiliation".bold(), affiliation);
    }
    print_element("Abstract", &doc.abstract_text);
    print_element("Keywords", &doc.keywords);

    println!();
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for section in &doc.sections {
        let indent = "  ".repeat(section.level.saturating_sub(1) as usize);
        println!(
            "{}{} {} {}",
            indent,
            section.number.bold(),
            section.title,
            format!(
                "(level {}, lines {}-{}, {} units)",
                section.level,
                section.span.start,
                section.span.end,
                section.body.len()
            )
            .dimmed()
        );
    }

    println!();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for table in &doc.tables {
        println!(
            "[{}] {} {}",
            table.id,
            table.caption,
            format!("({}x{})", table.row_count(), table.column_count()).dimmed()
        );
    }

    println!();
    println!("{}", "Equations".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for equation in &doc.equations {
        println!(
            "[{}] {} {}",
            equation.id,
            equation.canonical_form,
            format!("({}, {:.2})", equation.method, equation.confidence).dimmed()
        );
    }

    let dangling = doc.dangling_placeholders();
    if !dangling.is_empty() {
        println!();
        println!(
            "{} {}",
            "Dangling placeholders:".yellow().bold(),
            dangling
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}

fn print_element(label: &str, element: &DetectedElement) {
    if element.is_detected() {
        let text = element.text.replace('\n', " ");
        let preview: String = text.chars().take(70).collect();
        println!(
            "{}: {} {}",
            label.bold(),
            preview,
            format!("[{:.2}]", element.confidence).green()
        );
    } else {
        println!("{}: {}", label.bold(), "not detected".yellow());
    }
    println!("  {} {}", "└─".dimmed(), element.reasoning.dimmed());
}

fn cmd_json(
    input: &Path,
    math_dir: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = convert::load(input, math_dir)?;
    log_bundle(input, &bundle);
    let doc = ManuscriptParser::new().parse(&bundle);

    let json = if summary {
        let summary = render::summarize(&doc);
        if compact {
            serde_json::to_string(&summary)?
        } else {
            serde_json::to_string_pretty(&summary)?
        }
    } else if compact {
        render::to_json(&doc, JsonFormat::Compact)?
    } else {
        render::to_json(&doc, JsonFormat::Pretty)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_templates() {
    println!("{}", "Templates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for profile in TemplateProfile::all() {
        println!(
            "{:<10} {} {}",
            profile.kind.name().bold(),
            profile.display_name,
            profile.document_class.dimmed()
        );
    }
}

fn cmd_version() {
    println!("{} {}", "papertex".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Manuscript to LaTeX conversion tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "Paper Title\nJ. Doe\nAbstract: We study X.\n1. Introduction\nSome text.\n\
                         References\n1. A. Author, First paper, 2020.";

    #[test]
    fn test_convert_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.txt");
        let output = dir.path().join("paper.tex");
        fs::write(&input, PAPER).unwrap();

        cmd_convert(&input, Some(Template::Acm), None, None, Some(&output), false).unwrap();

        let latex = fs::read_to_string(&output).unwrap();
        assert!(latex.starts_with("\\documentclass[sigconf]{acmart}"));
        assert!(latex.contains("\\section{Introduction}"));
        assert!(latex.contains("\\bibitem{b1} A. Author, First paper, 2020."));
    }

    #[test]
    fn test_json_summary_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paper.txt");
        let output = dir.path().join("paper.json");
        fs::write(&input, PAPER).unwrap();

        cmd_json(&input, None, Some(&output), true, true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["title"], "Paper Title");
        assert_eq!(value["outline"][0]["title"], "Introduction");
        assert_eq!(value["outline"][1]["title"], "References");
        assert_eq!(value["has_abstract"], true);
    }

    #[test]
    fn test_convert_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = cmd_convert(&dir.path().join("missing.txt"), None, None, None, None, false);
        assert!(result.is_err());
    }
}
