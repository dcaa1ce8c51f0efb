//! Paste command: changelog for pasted `git log --oneline` text.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::GenerationArgs;

/// Paste command options.
#[derive(Parser)]
pub struct PasteCommand {
    /// Reads the log from this file instead of stdin.
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Generation and output options.
    #[command(flatten)]
    pub generation: GenerationArgs,
}

impl PasteCommand {
    /// Executes the paste command.
    pub async fn execute(self) -> Result<()> {
        let pipeline = self.generation.pipeline()?;

        let text = match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read git log from {}", path.display()))?,
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read git log from stdin")?;
                text
            }
        };

        let changelog = pipeline.from_text(&text).await?;
        self.generation.emit(&changelog)
    }
}
