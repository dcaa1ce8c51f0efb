//! Colorized terminal renderer.

use anyhow::Result;
use termcolor::{Color, ColorSpec, WriteColor};

use super::commit_count_label;
use crate::changelog::ChangelogSection;

const BANNER_WIDTH: usize = 70;

/// Writes sections to a color-capable stream.
///
/// Headers are uppercased and colored by category. An item ending in a
/// parenthesized group has that group split off and highlighted as its
/// timestamp. Every item is followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    /// Creates the renderer.
    pub fn new() -> Self {
        Self
    }

    /// Writes the banner, all sections and the closing rule to `out`.
    pub fn render<W: WriteColor>(
        &self,
        out: &mut W,
        sections: &[ChangelogSection],
        commit_count: usize,
    ) -> Result<()> {
        self.write_banner(out, commit_count)?;

        for section in sections {
            self.write_section(out, section)?;
        }

        writeln!(out, "\n{}\n", "=".repeat(BANNER_WIDTH))?;
        out.flush()?;
        Ok(())
    }

    fn write_banner<W: WriteColor>(&self, out: &mut W, commit_count: usize) -> Result<()> {
        let rule = "=".repeat(BANNER_WIDTH);
        let subtitle = format!("(Last {})", commit_count_label(commit_count));

        writeln!(out)?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        writeln!(out, "{rule}")?;
        writeln!(out, "{:^BANNER_WIDTH$}", "CHANGELOG")?;
        writeln!(out, "{subtitle:^BANNER_WIDTH$}")?;
        writeln!(out, "{rule}")?;
        out.reset()?;
        writeln!(out)?;
        Ok(())
    }

    fn write_section<W: WriteColor>(&self, out: &mut W, section: &ChangelogSection) -> Result<()> {
        let color = section_color(section);

        writeln!(out)?;
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "*** {} ***", section.category_name.to_uppercase())?;
        out.reset()?;
        writeln!(out, "\n")?;

        for item in &section.items {
            self.write_item(out, item)?;
        }
        Ok(())
    }

    fn write_item<W: WriteColor>(&self, out: &mut W, item: &str) -> Result<()> {
        out.set_color(ColorSpec::new().set_fg(Some(Color::White)))?;
        write!(out, "  •")?;
        out.reset()?;

        match split_timestamp(item) {
            Some((text, time)) => {
                write!(out, " {text} ")?;
                out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
                write!(out, "{time}")?;
                out.reset()?;
                writeln!(out)?;
            }
            None => writeln!(out, " {item}")?,
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Header color of the known category in the label; white otherwise.
fn section_color(section: &ChangelogSection) -> Color {
    match section.known_category() {
        Some("Features") => Color::Green,
        Some("Fixes") => Color::Red,
        Some("Improvements") => Color::Blue,
        Some("Deletions") => Color::Magenta,
        Some("Documentation") => Color::Cyan,
        Some("Other") => Color::Yellow,
        _ => Color::White,
    }
}

/// Splits `"text (time)"` at the last `(` when the item ends with `)`.
fn split_timestamp(item: &str) -> Option<(&str, &str)> {
    if !item.ends_with(')') {
        return None;
    }
    let open = item.rfind('(')?;
    Some((item[..open].trim_end(), &item[open..]))
}
