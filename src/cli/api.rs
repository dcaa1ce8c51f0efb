//! Api command: serve one JSON request from stdin or a file.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::ai::ClaudeAiClient;
use crate::api::{ApiService, Endpoint};
use crate::github::DEFAULT_API_BASE;
use crate::pipeline::ChangelogPipeline;

/// Api command options.
#[derive(Parser)]
pub struct ApiCommand {
    /// Endpoint to call.
    #[arg(value_enum)]
    pub endpoint: Endpoint,

    /// Reads the JSON request from this file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Claude model for generating endpoints.
    #[arg(long)]
    pub model: Option<String>,

    /// GitHub REST API base.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE)]
    pub github_api_url: String,
}

impl ApiCommand {
    /// Executes the api command. Exits 1 when the reply is not a success.
    pub async fn execute(self) -> Result<()> {
        let body = self.read_request()?;

        let mut service = ApiService::new(self.github_api_url.as_str());
        if self.endpoint.needs_generation() {
            let info = crate::utils::check_ai_credentials(self.model.as_deref())?;
            let client = ClaudeAiClient::from_env(Some(&info.model))?;
            service = service.with_pipeline(ChangelogPipeline::new(Box::new(client)));
        }

        let reply = service.dispatch(self.endpoint, &body).await;
        let json = serde_json::to_string_pretty(&reply.body)
            .context("Failed to serialize API reply")?;
        println!("{json}");

        if !reply.is_success() {
            anyhow::bail!("{} returned status {}", self.endpoint.path(), reply.status);
        }
        Ok(())
    }

    fn read_request(&self) -> Result<String> {
        if self.endpoint == Endpoint::Health {
            return Ok(String::new());
        }
        match &self.request {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request from {}", path.display())),
            None => {
                let mut body = String::new();
                std::io::stdin()
                    .read_to_string(&mut body)
                    .context("Failed to read request from stdin")?;
                Ok(body)
            }
        }
    }
}
