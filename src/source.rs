//! One capability over the three commit sources.

use std::path::PathBuf;

use crate::error::Result;
use crate::git::repository::DEFAULT_TO_REF;
use crate::git::{CommitRecord, LocalGitAdapter, PastedLogAdapter, RefRange};
use crate::github::{DateWindow, RemoteGitHubAdapter, RepoSlug, DEFAULT_API_BASE};

/// Commits read from a local repository when no limit is given.
pub const DEFAULT_LOCAL_LIMIT: usize = 50;

/// Commits requested from GitHub when no limit is given.
pub const DEFAULT_REMOTE_LIMIT: usize = 100;

/// A local repository and ref range.
#[derive(Debug, Clone)]
pub struct LocalSource {
    /// Repository path.
    pub path: PathBuf,
    /// Range to walk.
    pub range: RefRange,
}

/// A GitHub repository and optional date window.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    /// OAuth or personal access token.
    pub access_token: String,
    /// Repository to list.
    pub slug: RepoSlug,
    /// `since`/`until` bounds.
    pub window: DateWindow,
    /// REST API base.
    pub api_base: String,
}

impl GitHubSource {
    /// Source against the public API.
    pub fn new(access_token: impl Into<String>, slug: RepoSlug, window: DateWindow) -> Self {
        Self {
            access_token: access_token.into(),
            slug,
            window,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Overrides the API base.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

/// Free-form pasted log text.
#[derive(Debug, Clone)]
pub struct PastedSource {
    /// Raw multi-line text.
    pub text: String,
}

/// Where a pipeline run reads its commits from.
#[derive(Debug, Clone)]
pub enum CommitSource {
    /// Local repository via libgit2.
    Local(LocalSource),
    /// GitHub REST API.
    GitHub(GitHubSource),
    /// Pasted `git log --oneline` style text.
    Pasted(PastedSource),
}

impl CommitSource {
    /// Reads commits newest first. `None` applies the source default:
    /// 50 local, 100 remote, unbounded pasted.
    pub async fn normalize(&self, limit: Option<usize>) -> Result<Vec<CommitRecord>> {
        match self {
            Self::Local(source) => LocalGitAdapter::new(&source.path)
                .normalize(&source.range, limit.unwrap_or(DEFAULT_LOCAL_LIMIT)),
            Self::GitHub(source) => {
                let adapter = RemoteGitHubAdapter::with_api_base(
                    source.access_token.as_str(),
                    source.api_base.as_str(),
                )
                .map_err(|e| crate::error::ShipNoteError::RemoteApi(format!("{e:#}")))?;
                let remote = adapter
                    .normalize(
                        &source.slug,
                        &source.window,
                        limit.unwrap_or(DEFAULT_REMOTE_LIMIT),
                    )
                    .await?;
                Ok(remote.commits)
            }
            Self::Pasted(source) => Ok(PastedLogAdapter::new().normalize(&source.text, limit)),
        }
    }

    /// Range bounds stated in the prompt header.
    ///
    /// GitHub sources use `since` as the lower and `until` (or `HEAD`) as
    /// the upper bound; pasted text has no range.
    pub fn range_bounds(&self) -> (Option<String>, String) {
        match self {
            Self::Local(source) => (source.range.from_ref.clone(), source.range.to_ref.clone()),
            Self::GitHub(source) => (
                source.window.since.clone(),
                source
                    .window
                    .until
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TO_REF.to_string()),
            ),
            Self::Pasted(_) => (None, DEFAULT_TO_REF.to_string()),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::GitHub(_) => "github",
            Self::Pasted(_) => "pasted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShipNoteError;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn pasted_source_normalizes_text() {
        let source = CommitSource::Pasted(PastedSource {
            text: "a83b1c9 fix(auth): resolve bug\nb1d4e2a feat(ui): add toggle".to_string(),
        });
        let commits = source.normalize(None).await.unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(source.range_bounds(), (None, "HEAD".to_string()));
        assert_eq!(source.kind(), "pasted");
    }

    #[tokio::test]
    async fn local_source_reports_access_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = CommitSource::Local(LocalSource {
            path: dir.path().to_path_buf(),
            range: RefRange::new(Some("v1.0.0".to_string()), None),
        });
        assert_eq!(
            source.range_bounds(),
            (Some("v1.0.0".to_string()), "HEAD".to_string())
        );
        let err = source.normalize(None).await.unwrap_err();
        assert!(matches!(err, ShipNoteError::RepositoryAccess { .. }));
    }

    #[tokio::test]
    async fn github_source_uses_default_limit_and_window_bounds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let window = DateWindow {
            since: Some("2024-01-01T00:00:00Z".to_string()),
            until: None,
        };
        let source = CommitSource::GitHub(
            GitHubSource::new("gho_test", RepoSlug::new("acme", "widgets"), window)
                .with_api_base(server.uri()),
        );

        assert!(source.normalize(None).await.unwrap().is_empty());
        assert_eq!(
            source.range_bounds(),
            (Some("2024-01-01T00:00:00Z".to_string()), "HEAD".to_string())
        );
    }
}
