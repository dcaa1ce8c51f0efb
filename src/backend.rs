//! Client for a remote ShipNote service.
//!
//! The clone command reads commits locally and hands them to a running
//! service (`shipnote api` behind any HTTP front end, or a compatible
//! deployment) for generation.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::git::CommitRecord;

/// Service base URL used when `SHIPNOTE_API` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Outer timeout for one generation round trip.
pub const BACKEND_TIMEOUT: Duration = Duration::from_secs(90);

const GENERATE_NOTES_PATH: &str = "/api/generate-notes";

#[derive(Serialize)]
struct GenerateNotesRequest<'a> {
    commits: &'a [CommitRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    to: &'a str,
}

#[derive(Deserialize)]
struct GenerateNotesResponse {
    #[serde(default)]
    success: bool,
    notes: Option<String>,
    commit_count: Option<usize>,
    error: Option<String>,
}

/// Notes returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendNotes {
    /// Raw generated markdown.
    pub notes: String,
    /// Number of commits the service received.
    pub commit_count: usize,
}

/// HTTP client for `POST /api/generate-notes`.
pub struct ShipNoteBackend {
    client: Client,
    api_url: String,
}

impl ShipNoteBackend {
    /// Creates a client for the service at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Sends `commits` for generation and returns the notes.
    pub async fn generate_notes(
        &self,
        commits: &[CommitRecord],
        from_ref: Option<&str>,
        to_ref: &str,
    ) -> Result<BackendNotes> {
        let url = format!("{}{GENERATE_NOTES_PATH}", self.api_url);
        info!(url = %url, commit_count = commits.len(), "Sending commits to ShipNote backend");

        let response = self
            .client
            .post(&url)
            .json(&GenerateNotesRequest {
                commits,
                from: from_ref,
                to: to_ref,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach backend API at {}", self.api_url))?;

        let status = response.status();
        debug!(status = %status, "Backend responded");
        let body: Option<GenerateNotesResponse> = response.json().await.ok();

        if !status.is_success() {
            match body.and_then(|b| b.error) {
                Some(error) => bail!(
                    "Request failed with status code {}: {error}",
                    status.as_u16()
                ),
                None => bail!("Request failed with status code {}", status.as_u16()),
            }
        }

        let body = body.context("Backend returned an unreadable response")?;
        if !body.success {
            bail!(
                "API error: {}",
                body.error.as_deref().unwrap_or("unknown error")
            );
        }

        Ok(BackendNotes {
            notes: body.notes.unwrap_or_default(),
            commit_count: body.commit_count.unwrap_or(commits.len()),
        })
    }
}
