//! GitHub repository URLs and the remote commit adapter.

pub mod client;
pub mod url;

pub use client::{DateWindow, RemoteCommits, RemoteGitHubAdapter, DEFAULT_API_BASE};
pub use url::{parse_github_url, RepoSlug};
