//! Pipeline orchestrator: source → prompt → generation → parse.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::ai::AiClient;
use crate::changelog::{build_prompt, parse, ChangelogSection};
use crate::error::{Result, ShipNoteError};
use crate::git::repository::DEFAULT_TO_REF;
use crate::git::{CommitRecord, RefRange};
use crate::github::{parse_github_url, DateWindow};
use crate::source::{CommitSource, GitHubSource, LocalSource, PastedSource};

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Changelog {
    /// Commits the changelog was generated from, newest first.
    pub commits: Vec<CommitRecord>,
    /// Raw markdown returned by the generation backend.
    pub notes: String,
    /// Parsed sections of `notes`.
    pub sections: Vec<ChangelogSection>,
}

impl Changelog {
    /// Number of commits sent to the backend.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }
}

/// Composes one source adapter, the prompt builder, a generation backend
/// and the response parser.
///
/// Each entry point performs at most one source read and one generation
/// call. Nothing is retried.
pub struct ChangelogPipeline {
    ai: Box<dyn AiClient>,
}

impl ChangelogPipeline {
    /// Creates a pipeline around a generation backend.
    pub fn new(ai: Box<dyn AiClient>) -> Self {
        Self { ai }
    }

    /// Generates a changelog for already-normalized commits.
    ///
    /// Fails with a validation error before any generation call when
    /// `commits` is empty.
    pub async fn generate(
        &self,
        commits: Vec<CommitRecord>,
        from_ref: Option<&str>,
        to_ref: &str,
    ) -> Result<Changelog> {
        if commits.is_empty() {
            return Err(ShipNoteError::validation("No commits provided"));
        }

        let prompt = build_prompt(&commits, from_ref, to_ref);
        let metadata = self.ai.get_metadata();
        info!(
            provider = %metadata.provider,
            model = %metadata.model,
            commit_count = commits.len(),
            "Requesting changelog generation"
        );

        let notes = self
            .ai
            .send_request(&prompt.system, &prompt.user)
            .await
            .map_err(|e| ShipNoteError::GenerationBackend(format!("{e:#}")))?;

        let sections = parse(&notes);
        debug!(sections = sections.len(), "Generation complete");

        Ok(Changelog {
            commits,
            notes,
            sections,
        })
    }

    /// Reads commits from `source` and generates a changelog for them.
    ///
    /// An empty read is a validation error with `empty_message`.
    pub async fn from_source(
        &self,
        source: &CommitSource,
        limit: Option<usize>,
        empty_message: &str,
    ) -> Result<Changelog> {
        let commits = source.normalize(limit).await?;
        info!(source = source.kind(), count = commits.len(), "Collected commits");
        if commits.is_empty() {
            return Err(ShipNoteError::validation(empty_message));
        }

        let (from_ref, to_ref) = source.range_bounds();
        self.generate(commits, from_ref.as_deref(), &to_ref).await
    }

    /// Structured commits as supplied by a caller; records are re-normalized.
    pub async fn from_commits(
        &self,
        commits: Vec<CommitRecord>,
        from_ref: Option<&str>,
        to_ref: Option<&str>,
    ) -> Result<Changelog> {
        let commits = commits.into_iter().map(CommitRecord::normalized).collect();
        self.generate(commits, from_ref, to_ref.unwrap_or(DEFAULT_TO_REF))
            .await
    }

    /// Local repository entry point.
    pub async fn from_repo(
        &self,
        repo_path: impl Into<PathBuf>,
        range: RefRange,
        limit: Option<usize>,
    ) -> Result<Changelog> {
        let source = CommitSource::Local(LocalSource {
            path: repo_path.into(),
            range,
        });
        self.from_source(&source, limit, "No commits found in the specified range")
            .await
    }

    /// Pasted-text entry point.
    pub async fn from_text(&self, git_log_text: &str) -> Result<Changelog> {
        if git_log_text.trim().is_empty() {
            return Err(ShipNoteError::validation("No git log text provided"));
        }

        let source = CommitSource::Pasted(PastedSource {
            text: git_log_text.to_string(),
        });
        self.from_source(
            &source,
            None,
            "Could not parse any commits from the provided text",
        )
        .await
    }

    /// GitHub URL entry point.
    pub async fn from_github_url(
        &self,
        access_token: &str,
        repo_url: &str,
        window: DateWindow,
        limit: Option<usize>,
        api_base: &str,
    ) -> Result<Changelog> {
        let slug = parse_github_url(repo_url)
            .ok_or_else(|| ShipNoteError::MalformedUrl(repo_url.to_string()))?;

        let source = CommitSource::GitHub(
            GitHubSource::new(access_token, slug, window).with_api_base(api_base),
        );
        self.from_source(&source, limit, "No commits found in the specified range")
            .await
    }
}
