//! Repo command: changelog for a local repository.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use super::GenerationArgs;
use crate::git::RefRange;
use crate::source::DEFAULT_LOCAL_LIMIT;

/// Repo command options.
#[derive(Parser)]
pub struct RepoCommand {
    /// Path to the repository.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Exclusive start of the range (tag, branch or hash).
    #[arg(long)]
    pub from: Option<String>,

    /// Inclusive end of the range.
    #[arg(long, default_value = "HEAD")]
    pub to: String,

    /// Maximum number of commits to include.
    #[arg(long, short = 'n', default_value_t = DEFAULT_LOCAL_LIMIT)]
    pub limit: usize,

    /// Generation and output options.
    #[command(flatten)]
    pub generation: GenerationArgs,
}

impl RepoCommand {
    /// Executes the repo command.
    pub async fn execute(self) -> Result<()> {
        let pipeline = self.generation.pipeline()?;
        let range = RefRange::new(self.from, Some(self.to));

        println!(
            "🔍 Reading up to {} commits ({}) from {}...",
            self.limit,
            range.spec(),
            self.path.display()
        );
        let changelog = pipeline
            .from_repo(&self.path, range, Some(self.limit))
            .await?;

        self.generation.emit(&changelog)
    }
}
