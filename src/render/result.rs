//! Rendering result with statistics.

use serde::{Deserialize, Serialize};

use super::template::TemplateKind;

/// Result of serializing a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The LaTeX source
    pub content: String,

    /// Template the source was produced for
    pub template: TemplateKind,

    /// Serialization statistics
    pub stats: SerializationStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, template: TemplateKind, stats: SerializationStats) -> Self {
        Self {
            content,
            template,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics collected while serializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializationStats {
    /// Sections emitted as headings
    pub section_count: u32,

    /// Tables rendered
    pub table_count: u32,

    /// Equations rendered
    pub equation_count: u32,

    /// Tables and equations appended because no placeholder referenced them
    pub appended_count: u32,

    /// Placeholders rendered literally because they resolve to nothing
    pub dangling_count: u32,

    /// Bibliography entries split from a references section
    pub bibliography_entries: u32,

    /// Tables whose cells were abbreviated or wrapped
    pub abbreviated_tables: u32,

    /// Tables placed in a spanning float
    pub spanning_tables: u32,
}

impl SerializationStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment section count.
    pub fn add_section(&mut self) {
        self.section_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Increment equation count.
    pub fn add_equation(&mut self) {
        self.equation_count += 1;
    }

    /// Increment appended item count.
    pub fn add_appended(&mut self) {
        self.appended_count += 1;
    }

    /// Increment dangling placeholder count.
    pub fn add_dangling(&mut self) {
        self.dangling_count += 1;
    }

    /// Total rendered tables and equations.
    pub fn item_count(&self) -> u32 {
        self.table_count + self.equation_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let mut stats = SerializationStats::new();
        stats.add_section();
        stats.add_table();
        stats.add_equation();
        stats.add_equation();
        stats.add_appended();
        stats.add_dangling();

        assert_eq!(stats.section_count, 1);
        assert_eq!(stats.item_count(), 3);
        assert_eq!(stats.appended_count, 1);
        assert_eq!(stats.dangling_count, 1);
    }

    #[test]
    fn test_render_result() {
        let result = RenderResult::new("x".into(), TemplateKind::Acm, SerializationStats::new());
        assert_eq!(result.content_len(), 1);
        assert_eq!(result.template, TemplateKind::Acm);
    }
}
