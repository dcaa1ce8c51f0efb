//! Clone command: shallow-clone a repository and ask a ShipNote service
//! for its changelog.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use crate::backend::{ShipNoteBackend, DEFAULT_API_URL};
use crate::changelog::{parse, ChangelogSection};
use crate::git::repository::DEFAULT_TO_REF;
use crate::git::{ClonedRepository, LocalGitAdapter, RefRange};
use crate::source::DEFAULT_LOCAL_LIMIT;

/// Largest accepted commit count.
const MAX_LIMIT: usize = 100;

/// Clone command options.
#[derive(Parser)]
pub struct CloneCommand {
    /// Repository URL to clone (prompted when absent).
    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// Number of recent commits to include, 1-100 (prompted when absent).
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u16).range(1..=100))]
    pub limit: Option<u16>,

    /// ShipNote service base URL.
    #[arg(long, env = "SHIPNOTE_API", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Leaves the temporary clone on disk and prints its path.
    #[arg(long)]
    pub keep_temp: bool,

    /// Writes the markdown changelog to this file without asking.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Saves the markdown changelog to a temporary file without asking.
    #[arg(long, conflicts_with = "output")]
    pub save: bool,

    /// Opens the saved markdown file in an editor.
    #[arg(long)]
    pub open: bool,
}

/// Changelog produced for a clone.
struct CloneOutcome {
    sections: Vec<ChangelogSection>,
    commit_count: usize,
}

impl CloneCommand {
    /// Executes the clone command.
    pub async fn execute(self) -> Result<()> {
        let url = self.resolve_url()?;
        let limit = self.resolve_limit()?;
        crate::utils::check_git_available()?;

        println!("📥 Cloning repository (last {limit} commits)...");
        // Dropped on every return path below, before `main` exits.
        let clone = ClonedRepository::create()?;
        clone.clone_shallow(&url, limit, ctrl_c()).await?;
        println!("✓ Repository cloned successfully");

        let result = tokio::select! {
            result = self.run(clone.path(), limit) => result,
            () = ctrl_c() => Err(anyhow::anyhow!("Interrupted")),
        };

        if self.keep_temp {
            let path = clone.keep();
            println!("📁 Temporary repository kept at: {}", path.display());
        } else {
            println!("🧹 Cleaning up temporary repository clone...");
            drop(clone);
        }

        result
    }

    async fn run(&self, repo_path: &Path, limit: usize) -> Result<()> {
        let outcome = self.generate(repo_path, limit).await?;
        super::print_changelog(&outcome.sections, outcome.commit_count)?;

        let target = match (&self.output, self.save) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(temp_markdown_path()?),
            (None, false) => {
                let wants_file = tokio::task::spawn_blocking(ask_save_to_file)
                    .await
                    .context("Prompt task failed")??;
                if wants_file {
                    Some(temp_markdown_path()?)
                } else {
                    println!("Exiting without saving file.");
                    None
                }
            }
        };

        if let Some(path) = target {
            super::write_markdown(&path, &outcome.sections, outcome.commit_count)?;
            println!("💾 Changelog saved to: {}", path.display());
            // A prompted "yes" opens the file, as does --open.
            if self.open || (self.output.is_none() && !self.save) {
                open_in_editor(&path);
            }
        }
        Ok(())
    }

    async fn generate(&self, repo_path: &Path, limit: usize) -> Result<CloneOutcome> {
        println!("🔍 Reading up to last {limit} commits...");
        let adapter = LocalGitAdapter::new(repo_path);
        let commits = tokio::task::spawn_blocking(move || {
            adapter.normalize(&RefRange::default(), limit)
        })
        .await
        .context("Commit read task failed")?
        .context("Failed to get git log")?;

        let count = commits.len();
        println!("✓ {} extracted", crate::render::commit_count_label(count));

        println!("🤖 Sending commit data to {} for changelog generation...", self.api_url);
        let backend = ShipNoteBackend::new(self.api_url.as_str())?;
        let notes = backend
            .generate_notes(&commits, None, DEFAULT_TO_REF)
            .await?;
        println!("✓ Changelog generated successfully!\n");

        Ok(CloneOutcome {
            sections: parse(&notes.notes),
            commit_count: count,
        })
    }

    fn resolve_url(&self) -> Result<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }
        if !io::stdin().is_terminal() {
            bail!("GitHub repository URL is required! Pass --url.");
        }

        let url = prompt_line("Enter GitHub repository URL: ")?;
        if url.is_empty() {
            bail!("GitHub repository URL is required!");
        }
        Ok(url)
    }

    fn resolve_limit(&self) -> Result<usize> {
        if let Some(limit) = self.limit {
            return Ok(usize::from(limit));
        }
        if !io::stdin().is_terminal() {
            return Ok(DEFAULT_LOCAL_LIMIT);
        }

        loop {
            let answer = prompt_line(&format!(
                "How many commits do you want to analyze? (1-{MAX_LIMIT}, default {DEFAULT_LOCAL_LIMIT}): "
            ))?;
            match parse_limit_answer(&answer) {
                Ok(limit) => return Ok(limit),
                Err(message) => println!("{message}"),
            }
        }
    }
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Interprets the commit-count prompt answer; blank means the default.
fn parse_limit_answer(answer: &str) -> std::result::Result<usize, &'static str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(DEFAULT_LOCAL_LIMIT);
    }
    match answer.parse::<usize>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        Ok(_) => Err("Please enter a number between 1 and 100"),
        Err(_) => Err("Please enter a valid number"),
    }
}

/// Interprets a yes/no answer.
fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

fn ask_save_to_file() -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    loop {
        let answer =
            prompt_line("\nDo you want to create a Markdown file for better visibility? (yes/no): ")?;
        match parse_yes_no(&answer) {
            Some(choice) => return Ok(choice),
            None => println!("Please enter 'yes' or 'no'"),
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Creates a persistent temporary `.md` file and returns its path.
fn temp_markdown_path() -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("shipnote_changelog_")
        .suffix(".md")
        .tempfile()
        .context("Failed to create temporary markdown file")?;
    let (_, path) = file
        .keep()
        .context("Failed to persist temporary markdown file")?;
    Ok(path)
}

/// Opens `path` with VS Code, falling back to the platform opener.
fn open_in_editor(path: &Path) {
    println!("📂 Opening file...");
    if Command::new("code").arg(path).status().is_ok_and(|s| s.success()) {
        return;
    }

    let opener = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    };
    if let Err(e) = opener {
        debug!("Failed to open {}: {e}", path.display());
        println!("Open {} to view the changelog.", path.display());
    }
}
