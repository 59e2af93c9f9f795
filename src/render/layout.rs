//! Adaptive table layout.
//!
//! [`optimize_table`] maps a table's cell lengths to a density tier and
//! derives every layout decision from it: column widths, float environment,
//! font size, row and column spacing, and abbreviation level. It is a pure
//! function of the table and the template profile.

use crate::error::Result;
use crate::model::Table;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use super::template::TemplateProfile;

/// Column count from which a table is bumped one density tier.
const MANY_COLUMNS: usize = 6;
/// Column count from which a table spans both page columns.
const SPANNING_COLUMNS: usize = 5;
/// Row length (characters across all cells) from which a table spans both page columns.
const SPANNING_ROW_CHARS: usize = 80;

/// Content density bucket derived from cell text length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityTier {
    /// Under 5 characters
    VeryLow,
    /// Under 10 characters
    Low,
    /// Under 20 characters
    Medium,
    /// Under 35 characters
    High,
    /// Under 60 characters
    VeryHigh,
    /// 60 characters or more
    Extreme,
}

impl DensityTier {
    const ORDER: [DensityTier; 6] = [
        DensityTier::VeryLow,
        DensityTier::Low,
        DensityTier::Medium,
        DensityTier::High,
        DensityTier::VeryHigh,
        DensityTier::Extreme,
    ];

    /// Tier for an effective cell length.
    pub fn from_length(len: f32) -> Self {
        match len {
            l if l < 5.0 => DensityTier::VeryLow,
            l if l < 10.0 => DensityTier::Low,
            l if l < 20.0 => DensityTier::Medium,
            l if l < 35.0 => DensityTier::High,
            l if l < 60.0 => DensityTier::VeryHigh,
            _ => DensityTier::Extreme,
        }
    }

    /// Priority weight used for width allocation.
    pub fn weight(&self) -> f32 {
        match self {
            DensityTier::VeryLow => 1.0,
            DensityTier::Low => 1.5,
            DensityTier::Medium => 2.2,
            DensityTier::High => 3.0,
            DensityTier::VeryHigh => 4.0,
            DensityTier::Extreme => 5.0,
        }
    }

    /// The next denser tier, saturating at `Extreme`.
    pub fn denser(&self) -> Self {
        let pos = Self::ORDER.iter().position(|t| t == self).unwrap_or(0);
        Self::ORDER[(pos + 1).min(Self::ORDER.len() - 1)]
    }
}

/// Float environment for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableEnvironment {
    /// `table`, one text column wide
    SingleColumn,
    /// `table*`, spanning both text columns
    Spanning,
}

impl TableEnvironment {
    /// LaTeX environment name.
    pub fn name(&self) -> &'static str {
        match self {
            TableEnvironment::SingleColumn => "table",
            TableEnvironment::Spanning => "table*",
        }
    }
}

/// Font size used inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontTier {
    /// `\small`
    Small,
    /// `\footnotesize`
    FootnoteSize,
    /// `\scriptsize`
    ScriptSize,
    /// `\tiny`
    Tiny,
}

impl FontTier {
    /// LaTeX size command.
    pub fn command(&self) -> &'static str {
        match self {
            FontTier::Small => r"\small",
            FontTier::FootnoteSize => r"\footnotesize",
            FontTier::ScriptSize => r"\scriptsize",
            FontTier::Tiny => r"\tiny",
        }
    }
}

/// Row and column spacing inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingTier {
    /// Generous rows, 6pt column separation
    Relaxed,
    /// Default rows, 4pt column separation
    Normal,
    /// Slightly tighter rows, 3pt column separation
    Compact,
    /// Tightest rows, 2pt column separation
    Tight,
}

impl SpacingTier {
    /// `\arraystretch` value.
    pub fn array_stretch(&self) -> f32 {
        match self {
            SpacingTier::Relaxed => 1.2,
            SpacingTier::Normal => 1.0,
            SpacingTier::Compact => 0.9,
            SpacingTier::Tight => 0.85,
        }
    }

    /// `\tabcolsep` in points.
    pub fn column_separation_pt(&self) -> u8 {
        match self {
            SpacingTier::Relaxed => 6,
            SpacingTier::Normal => 4,
            SpacingTier::Compact => 3,
            SpacingTier::Tight => 2,
        }
    }
}

/// How aggressively cell content is shortened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbbreviationLevel {
    /// Content unchanged
    #[default]
    None,
    /// Dictionary substitution
    Light,
    /// Dictionary substitution and wrapping at 40 characters
    Moderate,
    /// Dictionary substitution and wrapping at 25 characters
    Aggressive,
}

impl AbbreviationLevel {
    /// Hard wrap width in characters, if the level wraps.
    pub fn wrap_width(&self) -> Option<usize> {
        match self {
            AbbreviationLevel::None | AbbreviationLevel::Light => None,
            AbbreviationLevel::Moderate => Some(40),
            AbbreviationLevel::Aggressive => Some(25),
        }
    }
}

/// Length statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Longest cell, in characters
    pub max_len: usize,
    /// Mean cell length, in characters
    pub avg_len: f32,
    /// Density tier of the column
    pub tier: DensityTier,
}

/// Layout decisions for one table under one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Per-column statistics
    pub columns: Vec<ColumnProfile>,
    /// Column widths as fractions of the line width
    pub widths: Vec<f32>,
    /// Density tier of the whole table
    pub tier: DensityTier,
    /// Float environment
    pub environment: TableEnvironment,
    /// Font size
    pub font: FontTier,
    /// Row and column spacing
    pub spacing: SpacingTier,
    /// Abbreviation level
    pub abbreviation: AbbreviationLevel,
}

impl TableLayout {
    /// Sum of all column widths.
    pub fn total_width(&self) -> f32 {
        self.widths.iter().sum()
    }
}

/// Compute the layout of a table for a template profile.
pub fn optimize_table(table: &Table, profile: &TemplateProfile) -> TableLayout {
    let columns = column_profiles(&table.grid);
    let tier = table_tier(&columns);
    let widths = allocate_widths(&columns, profile);

    let widest_row = table
        .grid
        .iter()
        .map(|row| row.iter().map(|c| c.chars().count()).sum::<usize>())
        .max()
        .unwrap_or(0);
    let spans = profile.is_double_column()
        && (columns.len() >= SPANNING_COLUMNS
            || tier >= DensityTier::High
            || widest_row > SPANNING_ROW_CHARS);
    let environment = if spans {
        TableEnvironment::Spanning
    } else {
        TableEnvironment::SingleColumn
    };

    let (font, spacing) = match tier {
        DensityTier::VeryLow | DensityTier::Low => (FontTier::Small, SpacingTier::Relaxed),
        DensityTier::Medium => (FontTier::FootnoteSize, SpacingTier::Normal),
        DensityTier::High | DensityTier::VeryHigh => (FontTier::ScriptSize, SpacingTier::Compact),
        DensityTier::Extreme => (FontTier::Tiny, SpacingTier::Tight),
    };

    let abbreviation = match tier {
        DensityTier::VeryLow | DensityTier::Low | DensityTier::Medium => AbbreviationLevel::None,
        DensityTier::High => AbbreviationLevel::Light,
        DensityTier::VeryHigh => AbbreviationLevel::Moderate,
        DensityTier::Extreme => AbbreviationLevel::Aggressive,
    };

    log::debug!(
        "optimize_table: table {} tier={:?} env={} font={:?} abbreviation={:?}",
        table.id,
        tier,
        environment.name(),
        font,
        abbreviation
    );

    TableLayout {
        columns,
        widths,
        tier,
        environment,
        font,
        spacing,
        abbreviation,
    }
}

fn column_profiles(grid: &[Vec<String>]) -> Vec<ColumnProfile> {
    let column_count = grid.iter().map(|r| r.len()).max().unwrap_or(0);
    let rows = grid.len().max(1);

    (0..column_count)
        .map(|col| {
            let lengths: Vec<usize> = grid
                .iter()
                .map(|row| row.get(col).map_or(0, |c| c.chars().count()))
                .collect();
            let max_len = lengths.iter().copied().max().unwrap_or(0);
            let avg_len = lengths.iter().sum::<usize>() as f32 / rows as f32;
            ColumnProfile {
                max_len,
                avg_len,
                tier: DensityTier::from_length(effective_length(max_len, avg_len)),
            }
        })
        .collect()
}

/// Blend of the longest and the typical cell.
fn effective_length(max_len: usize, avg_len: f32) -> f32 {
    (max_len as f32 + avg_len) / 2.0
}

fn table_tier(columns: &[ColumnProfile]) -> DensityTier {
    if columns.is_empty() {
        return DensityTier::VeryLow;
    }
    let mean = columns
        .iter()
        .map(|c| effective_length(c.max_len, c.avg_len))
        .sum::<f32>()
        / columns.len() as f32;
    let tier = DensityTier::from_length(mean);
    if columns.len() >= MANY_COLUMNS {
        tier.denser()
    } else {
        tier
    }
}

fn allocate_widths(columns: &[ColumnProfile], profile: &TemplateProfile) -> Vec<f32> {
    let bounds = profile.bounds;
    let total_weight: f32 = columns.iter().map(|c| c.tier.weight()).sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let mut widths: Vec<f32> = columns
        .iter()
        .map(|c| {
            (bounds.total * c.tier.weight() / total_weight)
                .clamp(bounds.min_column, bounds.max_column)
        })
        .collect();

    let sum: f32 = widths.iter().sum();
    if sum > bounds.total {
        let scale = bounds.total / sum;
        for w in &mut widths {
            *w *= scale;
        }
    }
    widths
}

/// One dictionary substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    /// Phrase to replace (matched case-insensitively on word boundaries)
    pub phrase: String,
    /// Replacement
    pub short: String,
}

/// Phrase-to-abbreviation lookup used for dense tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationDictionary {
    entries: Vec<Abbreviation>,
}

impl AbbreviationDictionary {
    /// Create a dictionary from entries.
    pub fn new(entries: Vec<Abbreviation>) -> Self {
        Self { entries }
    }

    /// Load a dictionary from a JSON object mapping phrases to abbreviations.
    ///
    /// ```
    /// use papertex::render::AbbreviationDictionary;
    ///
    /// let dict = AbbreviationDictionary::from_json(r#"{"Throughput": "Thr."}"#).unwrap();
    /// assert_eq!(dict.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let map: std::collections::BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::new(
            map.into_iter()
                .map(|(phrase, short)| Abbreviation { phrase, short })
                .collect(),
        ))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Abbreviation] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile the dictionary for repeated use.
    pub fn compile(&self) -> Abbreviator {
        let mut entries: Vec<&Abbreviation> = self.entries.iter().collect();
        // Longest phrases first so "Mean Average Precision" wins over "Precision".
        entries.sort_by(|a, b| b.phrase.chars().count().cmp(&a.phrase.chars().count()));

        let rules = entries
            .into_iter()
            .filter(|e| !e.phrase.trim().is_empty())
            .filter_map(|e| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(e.phrase.trim())))
                    .ok()
                    .map(|re| (re, e.short.clone()))
            })
            .collect();
        Abbreviator { rules }
    }
}

impl Default for AbbreviationDictionary {
    fn default() -> Self {
        const DEFAULTS: &[(&str, &str)] = &[
            ("Convolutional Neural Network", "CNN"),
            ("Recurrent Neural Network", "RNN"),
            ("Long Short-Term Memory", "LSTM"),
            ("Support Vector Machine", "SVM"),
            ("Natural Language Processing", "NLP"),
            ("Mean Average Precision", "mAP"),
            ("Artificial Intelligence", "AI"),
            ("Machine Learning", "ML"),
            ("Deep Learning", "DL"),
            ("Computer Vision", "CV"),
            ("Reinforcement Learning", "RL"),
            ("Standard Deviation", "Std."),
            ("Ground Truth", "GT"),
            ("Accuracy", "Acc."),
            ("Precision", "Prec."),
            ("Recall", "Rec."),
            ("Performance", "Perf."),
            ("Average", "Avg."),
            ("Maximum", "Max."),
            ("Minimum", "Min."),
            ("Number", "No."),
            ("Percentage", "Pct."),
            ("Approximately", "Approx."),
            ("Experiment", "Exp."),
            ("Configuration", "Config."),
            ("Parameters", "Params"),
            ("Validation", "Val."),
            ("Evaluation", "Eval."),
            ("Implementation", "Impl."),
            ("Information", "Info."),
            ("Comparison", "Comp."),
            ("Description", "Desc."),
            ("Method", "Meth."),
            ("Seconds", "s"),
            ("Milliseconds", "ms"),
        ];
        Self::new(
            DEFAULTS
                .iter()
                .map(|(phrase, short)| Abbreviation {
                    phrase: phrase.to_string(),
                    short: short.to_string(),
                })
                .collect(),
        )
    }
}

/// A compiled [`AbbreviationDictionary`].
pub struct Abbreviator {
    rules: Vec<(Regex, String)>,
}

impl Abbreviator {
    /// Substitute dictionary phrases in `text`.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (re, short) in &self.rules {
            if re.is_match(&out) {
                out = re.replace_all(&out, NoExpand(short)).into_owned();
            }
        }
        out
    }

    /// Shorten a cell at the given level, returning its lines.
    ///
    /// Levels that wrap split the cell on word boundaries; a single word
    /// longer than the width keeps its own line.
    pub fn abbreviate_cell(&self, text: &str, level: AbbreviationLevel) -> Vec<String> {
        if level == AbbreviationLevel::None {
            return vec![text.to_string()];
        }
        let text = self.substitute(text);
        match level.wrap_width() {
            Some(width) => wrap(&text, width),
            None => vec![text],
        }
    }
}

/// Greedy word wrap.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
