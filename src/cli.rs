//! CLI interface for shipnote.

use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use termcolor::{ColorChoice, StandardStream};

use crate::ai::ClaudeAiClient;
use crate::changelog::ChangelogSection;
use crate::pipeline::{Changelog, ChangelogPipeline};
use crate::render::{MarkdownFileRenderer, TerminalRenderer};

pub mod api;
pub mod clone;
pub mod github;
pub mod parse_url;
pub mod paste;
pub mod repo;

/// shipnote: turn git history into a categorized changelog.
#[derive(Parser)]
#[command(name = "shipnote")]
#[command(about = "Turn git commit history into a categorized, human-readable changelog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generates a changelog from a local repository.
    Repo(repo::RepoCommand),
    /// Generates a changelog from pasted `git log --oneline` text.
    Paste(paste::PasteCommand),
    /// Generates a changelog from a GitHub repository via the REST API.
    Github(github::GithubCommand),
    /// Clones a repository and asks a ShipNote service for its changelog.
    Clone(clone::CloneCommand),
    /// Serves one JSON request against an endpoint handler.
    Api(api::ApiCommand),
    /// Extracts owner and repository name from a GitHub URL.
    #[command(name = "parse-url")]
    ParseUrl(parse_url::ParseUrlCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Repo(cmd) => cmd.execute().await,
            Commands::Paste(cmd) => cmd.execute().await,
            Commands::Github(cmd) => cmd.execute().await,
            Commands::Clone(cmd) => cmd.execute().await,
            Commands::Api(cmd) => cmd.execute().await,
            Commands::ParseUrl(cmd) => cmd.execute(),
        }
    }
}

/// Options shared by the commands that call the generation backend.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Claude model to use (defaults to ANTHROPIC_MODEL or claude-sonnet-4-20250514).
    #[arg(long)]
    pub model: Option<String>,

    /// Also writes the changelog as markdown to this file.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerationArgs {
    /// Checks credentials and builds the pipeline.
    pub(crate) fn pipeline(&self) -> Result<ChangelogPipeline> {
        let info = crate::utils::check_ai_credentials(self.model.as_deref())?;
        let client = ClaudeAiClient::from_env(Some(&info.model))?;
        Ok(ChangelogPipeline::new(Box::new(client)))
    }

    /// Prints the changelog and writes the markdown file when requested.
    pub(crate) fn emit(&self, changelog: &Changelog) -> Result<()> {
        print_changelog(&changelog.sections, changelog.commit_count())?;
        if let Some(path) = &self.output {
            write_markdown(path, &changelog.sections, changelog.commit_count())?;
            println!("💾 Changelog saved to {}", path.display());
        }
        Ok(())
    }
}

/// Renders sections to stdout, colored only when stdout is a terminal.
pub(crate) fn print_changelog(sections: &[ChangelogSection], commit_count: usize) -> Result<()> {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    TerminalRenderer::new().render(&mut stdout, sections, commit_count)
}

/// Writes the markdown document to `path`.
pub(crate) fn write_markdown(
    path: &Path,
    sections: &[ChangelogSection],
    commit_count: usize,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create markdown file: {}", path.display()))?;
    MarkdownFileRenderer::new().write_to(&mut BufWriter::new(file), sections, commit_count)
}
