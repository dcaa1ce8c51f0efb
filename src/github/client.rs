//! Remote commit adapter for the GitHub REST API.

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, ShipNoteError};
use crate::git::commit::{truncate_hash, CommitRecord};
use crate::git::SHORT_HASH_LEN;
use crate::github::url::RepoSlug;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Largest page GitHub serves; the adapter never requests a second page.
pub const MAX_PAGE_SIZE: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    commit: GitCommitDetail,
    /// Linked GitHub account of the author, absent for unlinked emails.
    author: Option<ApiUser>,
    html_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GitCommitDetail {
    #[serde(default)]
    message: String,
    author: Option<GitIdentity>,
    committer: Option<GitIdentity>,
}

#[derive(Debug, Deserialize)]
struct GitIdentity {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: Option<String>,
}

impl ApiCommit {
    /// Platform login, then git author name, then committer name.
    fn author_name(&self) -> Option<&str> {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.trim().is_empty())
        }

        non_empty(self.author.as_ref().and_then(|a| a.login.as_deref()))
            .or_else(|| non_empty(self.commit.author.as_ref().and_then(|a| a.name.as_deref())))
            .or_else(|| {
                non_empty(
                    self.commit
                        .committer
                        .as_ref()
                        .and_then(|c| c.name.as_deref()),
                )
            })
    }

    fn into_record(self) -> CommitRecord {
        let author = self.author_name().map(str::to_string);
        let timestamp = self
            .commit
            .author
            .as_ref()
            .and_then(|a| a.date.clone())
            .unwrap_or_default();

        let record = CommitRecord::new(
            truncate_hash(&self.sha, SHORT_HASH_LEN),
            &self.commit.message,
            author.as_deref(),
            timestamp,
        );
        match self.html_url.filter(|u| !u.is_empty()) {
            Some(url) => record.with_source_url(url),
            None => record,
        }
    }
}

/// Optional ISO-8601 bounds for a remote commit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateWindow {
    /// Only commits after this instant.
    pub since: Option<String>,
    /// Only commits before this instant.
    pub until: Option<String>,
}

/// Commits returned by one remote listing.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteCommits {
    /// Normalized commits, newest first.
    pub commits: Vec<CommitRecord>,
    /// Number of commits returned.
    pub count: usize,
}

/// Source adapter for commits hosted on GitHub.
pub struct RemoteGitHubAdapter {
    client: Client,
    api_base: String,
    access_token: String,
}

impl RemoteGitHubAdapter {
    /// Creates an adapter against a custom API base (GitHub Enterprise, tests).
    pub fn with_api_base(
        access_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("shipnote/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn commits_url(&self, slug: &RepoSlug, window: &DateWindow, limit: usize) -> Result<Url> {
        let per_page = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut params = vec![("per_page", per_page.as_str())];
        if let Some(since) = window.since.as_deref() {
            params.push(("since", since));
        }
        if let Some(until) = window.until.as_deref() {
            params.push(("until", until));
        }

        let endpoint = format!(
            "{}/repos/{}/{}/commits",
            self.api_base, slug.owner, slug.repo
        );
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| ShipNoteError::RemoteApi(format!("Invalid API URL {endpoint}: {e}")))
    }

    /// Fetches one page of at most `min(limit, 100)` commits, newest first.
    pub async fn normalize(
        &self,
        slug: &RepoSlug,
        window: &DateWindow,
        limit: usize,
    ) -> Result<RemoteCommits> {
        let url = self.commits_url(slug, window, limit)?;
        info!(repo = %slug, url = %url, "Fetching commits from GitHub");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|e| ShipNoteError::RemoteApi(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "GitHub responded");
        match status {
            StatusCode::NOT_FOUND => return Err(ShipNoteError::RemoteNotFound),
            StatusCode::FORBIDDEN => return Err(ShipNoteError::RemoteForbidden),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_else(|e| {
                    debug!("Failed to read error response body: {e}");
                    String::new()
                });
                return Err(ShipNoteError::RemoteApi(format!("HTTP {s}: {body}")));
            }
            _ => {}
        }

        let page: Vec<ApiCommit> = response
            .json()
            .await
            .map_err(|e| ShipNoteError::RemoteApi(format!("Invalid response body: {e}")))?;

        let commits: Vec<CommitRecord> = page
            .into_iter()
            .take(limit.min(MAX_PAGE_SIZE))
            .map(ApiCommit::into_record)
            .collect();
        let count = commits.len();
        debug!(count, "Normalized GitHub commits");

        Ok(RemoteCommits { commits, count })
    }
}
