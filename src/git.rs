//! Commit records and the local/pasted source adapters.

pub mod clone;
pub mod commit;
pub mod pasted;
pub mod repository;

pub use clone::ClonedRepository;
pub use commit::{CommitRecord, UNKNOWN_AUTHOR};
pub use pasted::PastedLogAdapter;
pub use repository::{GitRepository, LocalGitAdapter, RefRange};

/// Number of hex characters kept in abbreviated hashes from git and GitHub.
pub const SHORT_HASH_LEN: usize = 7;
