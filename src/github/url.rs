//! GitHub repository URL parsing.

use serde::{Deserialize, Serialize};

/// Marker every accepted URL must contain.
const GITHUB_HOST: &str = "github.com";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSlug {
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name without any `.git` suffix.
    pub repo: String,
}

impl RepoSlug {
    /// Creates a slug from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extracts `(owner, repo)` from a GitHub repository URL.
///
/// Accepts `https://github.com/<owner>/<repo>`, `github.com/<owner>/<repo>`
/// and `git@github.com:<owner>/<repo>`, each optionally `.git`-suffixed and
/// with trailing slashes. Extra path segments after the repo are ignored.
/// Returns `None` without the `github.com` marker or when fewer than two
/// path segments follow it.
pub fn parse_github_url(url: &str) -> Option<RepoSlug> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    if !url.contains(GITHUB_HOST) {
        return None;
    }

    let path = if let Some((_, path)) = url.rsplit_once("github.com/") {
        path
    } else if let Some((_, path)) = url.rsplit_once("github.com:") {
        path
    } else {
        return None;
    };

    let mut segments = path.split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }

    Some(RepoSlug::new(owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_url() {
        assert_eq!(
            parse_github_url("https://github.com/acme/widgets"),
            Some(RepoSlug::new("acme", "widgets"))
        );
    }

    #[test]
    fn ssh_url_with_git_suffix() {
        assert_eq!(
            parse_github_url("git@github.com:acme/widgets.git"),
            Some(RepoSlug::new("acme", "widgets"))
        );
    }

    #[test]
    fn schemeless_url_with_trailing_slash() {
        assert_eq!(
            parse_github_url("github.com/acme/widgets/"),
            Some(RepoSlug::new("acme", "widgets"))
        );
        assert_eq!(
            parse_github_url("https://github.com/acme/widgets.git/"),
            Some(RepoSlug::new("acme", "widgets"))
        );
    }

    #[test]
    fn extra_segments_are_ignored() {
        assert_eq!(
            parse_github_url("https://github.com/acme/widgets/tree/main/src"),
            Some(RepoSlug::new("acme", "widgets"))
        );
    }

    #[test]
    fn other_hosts_are_rejected() {
        assert_eq!(parse_github_url("https://gitlab.com/acme/widgets"), None);
        assert_eq!(parse_github_url("not a url"), None);
        assert_eq!(parse_github_url(""), None);
    }

    #[test]
    fn missing_repo_segment_is_rejected() {
        assert_eq!(parse_github_url("https://github.com/acme"), None);
        assert_eq!(parse_github_url("https://github.com/"), None);
        assert_eq!(parse_github_url("git@github.com:acme"), None);
    }

    #[test]
    fn slug_display() {
        assert_eq!(RepoSlug::new("acme", "widgets").to_string(), "acme/widgets");
    }
}
