//! GitHub command: changelog for a repository read through the REST API.

use anyhow::Result;
use clap::Parser;

use super::GenerationArgs;
use crate::github::{DateWindow, DEFAULT_API_BASE};
use crate::source::DEFAULT_REMOTE_LIMIT;

/// GitHub command options.
#[derive(Parser)]
pub struct GithubCommand {
    /// Repository URL (https, ssh or bare `github.com/owner/repo`).
    #[arg(value_name = "URL")]
    pub url: String,

    /// Access token (defaults to GITHUB_TOKEN).
    #[arg(long)]
    pub token: Option<String>,

    /// Only commits after this ISO-8601 instant.
    #[arg(long)]
    pub since: Option<String>,

    /// Only commits before this ISO-8601 instant.
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum number of commits (one page, capped at 100).
    #[arg(long, short = 'n', default_value_t = DEFAULT_REMOTE_LIMIT)]
    pub limit: usize,

    /// GitHub REST API base.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_url: String,

    /// Generation and output options.
    #[command(flatten)]
    pub generation: GenerationArgs,
}

impl GithubCommand {
    /// Executes the github command.
    pub async fn execute(self) -> Result<()> {
        let token = crate::utils::check_github_token(self.token.as_deref())?;
        let pipeline = self.generation.pipeline()?;

        println!("🔍 Fetching up to {} commits from {}...", self.limit, self.url);
        let window = DateWindow {
            since: self.since,
            until: self.until,
        };
        let changelog = pipeline
            .from_github_url(&token, &self.url, window, Some(self.limit), &self.api_url)
            .await?;

        self.generation.emit(&changelog)
    }
}
