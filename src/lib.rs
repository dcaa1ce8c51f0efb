//! # shipnote
//!
//! Turns commit history into a categorized, human-readable changelog.
//!
//! Commits come from a local repository ([`git::LocalGitAdapter`]), the
//! GitHub REST API ([`github::RemoteGitHubAdapter`]) or pasted
//! `git log --oneline` text ([`git::PastedLogAdapter`]). All three normalize
//! into [`git::CommitRecord`]. The [`pipeline::ChangelogPipeline`] builds the
//! prompt, calls a generation backend ([`ai::AiClient`]) and parses the
//! markdown reply into [`changelog::ChangelogSection`]s, which the
//! [`render`] module prints to a terminal or writes as a markdown file.
//!
//! ```rust
//! use shipnote::changelog::parse;
//! use shipnote::render::MarkdownFileRenderer;
//!
//! let sections = parse("## Fixes:\n- Fixed login - by Jane (Nov 3, 2:30 PM)\n");
//! let doc = MarkdownFileRenderer::new().render(&sections, 1);
//! assert!(doc.contains("### FIXES"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod api;
pub mod backend;
pub mod changelog;
pub mod cli;
pub mod error;
pub mod git;
pub mod github;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::{Result, ShipNoteError};

/// The current version of shipnote.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
