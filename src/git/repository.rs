//! Local repository adapter backed by libgit2.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Commit, Repository, Sort};
use tracing::debug;

use crate::error::ShipNoteError;
use crate::git::commit::{truncate_hash, CommitRecord};
use crate::git::SHORT_HASH_LEN;

/// Display format for local commit timestamps, e.g. `Nov 08, 03:24 PM`.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%b %d, %I:%M %p";

/// Default upper bound of a ref range.
pub const DEFAULT_TO_REF: &str = "HEAD";

/// Commit range bounds: `from_ref..to_ref`, or just `to_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRange {
    /// Exclusive lower bound (tag, branch or hash).
    pub from_ref: Option<String>,
    /// Inclusive upper bound.
    pub to_ref: String,
}

impl Default for RefRange {
    fn default() -> Self {
        Self {
            from_ref: None,
            to_ref: DEFAULT_TO_REF.to_string(),
        }
    }
}

impl RefRange {
    /// Builds a range, defaulting a missing or blank `to_ref` to `HEAD`.
    pub fn new(from_ref: Option<String>, to_ref: Option<String>) -> Self {
        Self {
            from_ref: from_ref.filter(|f| !f.trim().is_empty()),
            to_ref: to_ref
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TO_REF.to_string()),
        }
    }

    /// Revision spec in git syntax.
    pub fn spec(&self) -> String {
        match &self.from_ref {
            Some(from) => format!("{from}..{}", self.to_ref),
            None => self.to_ref.clone(),
        }
    }
}

/// Thin wrapper over a `git2::Repository`.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository at the given path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    /// Returns up to `limit` commits in `range`, newest first.
    pub fn commits_in_range(&self, range: &RefRange, limit: usize) -> Result<Vec<CommitRecord>> {
        let to_commit = self.resolve_commit(&range.to_ref)?;

        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .set_sorting(Sort::TIME)
            .context("Failed to configure revwalk ordering")?;
        walker
            .push(to_commit.id())
            .context("Failed to push end commit")?;

        if let Some(from_ref) = &range.from_ref {
            let from_commit = self.resolve_commit(from_ref)?;
            walker
                .hide(from_commit.id())
                .context("Failed to hide start commit")?;
        }

        let mut records = Vec::new();
        for oid in walker.take(limit) {
            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;
            records.push(self.record_for(&commit)?);
        }

        debug!(range = %range.spec(), limit, count = records.len(), "Walked local commit range");
        Ok(records)
    }

    fn resolve_commit(&self, spec: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(spec)
            .with_context(|| format!("Failed to resolve reference: {spec}"))?
            .peel_to_commit()
            .with_context(|| format!("Reference does not point to a commit: {spec}"))
    }

    fn record_for(&self, commit: &Commit<'_>) -> Result<CommitRecord> {
        let full_hash = commit.id().to_string();
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();
        let author = commit.author();
        let timestamp = format_commit_time(commit.time())?;
        let files_changed = self.count_files_changed(commit)?;

        Ok(CommitRecord::new(
            truncate_hash(&full_hash, SHORT_HASH_LEN),
            &message,
            author.name(),
            timestamp,
        )
        .with_files_changed(files_changed))
    }

    /// Counts files in the diff against the first parent (or the empty tree).
    fn count_files_changed(&self, commit: &Commit<'_>) -> Result<usize> {
        let commit_tree = commit.tree().context("Failed to get commit tree")?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(
                commit
                    .parent(0)
                    .context("Failed to get parent commit")?
                    .tree()
                    .context("Failed to get parent tree")?,
            )
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
            .context("Failed to create diff")?;
        let stats = diff.stats().context("Failed to get diff stats")?;
        Ok(stats.files_changed())
    }
}

/// Formats a git timestamp in the offset it was recorded with.
fn format_commit_time(time: git2::Time) -> Result<String> {
    let offset =
        FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    let date = DateTime::from_timestamp(time.seconds(), 0)
        .context("Invalid commit timestamp")?
        .with_timezone(&offset);
    Ok(date.format(LOCAL_TIMESTAMP_FORMAT).to_string())
}

/// Source adapter for a repository on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalGitAdapter {
    path: PathBuf,
}

impl LocalGitAdapter {
    /// Creates an adapter for the repository at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads up to `limit` commits in `range`, newest first.
    pub fn normalize(
        &self,
        range: &RefRange,
        limit: usize,
    ) -> crate::error::Result<Vec<CommitRecord>> {
        GitRepository::open_at(&self.path)
            .and_then(|repo| repo.commits_in_range(range, limit))
            .map_err(|e| ShipNoteError::RepositoryAccess {
                path: self.path.display().to_string(),
                message: format!("{e:#}"),
            })
    }
}
