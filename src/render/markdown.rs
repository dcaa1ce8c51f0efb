//! Markdown document renderer.

use std::io::Write;

use anyhow::{Context, Result};

use super::commit_count_label;
use crate::changelog::ChangelogSection;

/// Renders sections as a standalone markdown document.
///
/// Layout: `# CHANGELOG`, an italic commit-count line, a horizontal rule,
/// then per section a `### ` heading with the uppercased category name and
/// each item as a `- ` bullet followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFileRenderer;

impl MarkdownFileRenderer {
    /// Creates the renderer.
    pub fn new() -> Self {
        Self
    }

    /// Renders the complete document.
    pub fn render(&self, sections: &[ChangelogSection], commit_count: usize) -> String {
        let mut out = String::from("# CHANGELOG\n\n");
        out.push_str(&format!("*Last {}*\n\n", commit_count_label(commit_count)));
        out.push_str("---\n\n");

        for section in sections {
            out.push_str(&format!(
                "\n### {}\n\n",
                section.category_name.to_uppercase()
            ));
            for item in &section.items {
                out.push_str(&format!("- {item}\n\n"));
            }
        }
        out
    }

    /// Renders the document into `sink`.
    pub fn write_to<W: Write>(
        &self,
        sink: &mut W,
        sections: &[ChangelogSection],
        commit_count: usize,
    ) -> Result<()> {
        sink.write_all(self.render(sections, commit_count).as_bytes())
            .context("Failed to write markdown changelog")?;
        sink.flush().context("Failed to flush markdown changelog")
    }
}
