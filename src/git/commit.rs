//! Canonical commit record shared by every source adapter.

use serde::{Deserialize, Serialize};

/// Author name used when no source field yields one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Message used when a source reports a commit with an empty message.
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "(no commit message)";

/// One normalized commit.
///
/// Field names on the wire follow the JSON shape the HTTP boundary has always
/// used (`hash`, `author`, `date`, `files_changed`, `url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Abbreviated hash; truncation length depends on the source.
    #[serde(rename = "hash")]
    pub short_hash: String,
    /// Commit message, trimmed.
    pub message: String,
    /// Display name of the author, `"Unknown"` when unresolvable.
    #[serde(rename = "author", default = "unknown_author")]
    pub author_display_name: String,
    /// Opaque display timestamp. Format differs per source.
    #[serde(rename = "date", default)]
    pub timestamp: String,
    /// Number of files touched, when the source can report it.
    #[serde(
        rename = "files_changed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub files_changed_count: Option<usize>,
    /// Web URL of the commit, for remote-sourced commits.
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

fn unknown_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl CommitRecord {
    /// Creates a record, trimming the message and defaulting blank authors.
    pub fn new(
        short_hash: impl Into<String>,
        message: &str,
        author: Option<&str>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            short_hash: short_hash.into(),
            message: normalize_message(message),
            author_display_name: normalize_author(author),
            timestamp: timestamp.into(),
            files_changed_count: None,
            source_url: None,
        }
    }

    /// Sets the number of changed files.
    #[must_use]
    pub fn with_files_changed(mut self, count: usize) -> Self {
        self.files_changed_count = Some(count);
        self
    }

    /// Sets the web URL of the commit.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Re-applies adapter normalization to a record built elsewhere
    /// (e.g. deserialized from a request body).
    #[must_use]
    pub fn normalized(self) -> Self {
        let author = self.author_display_name;
        Self {
            message: normalize_message(&self.message),
            author_display_name: normalize_author(Some(&author)),
            ..self
        }
    }

    /// Returns the first line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

fn normalize_message(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        EMPTY_MESSAGE_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_author(author: Option<&str>) -> String {
    match author.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

/// Truncates a hash to at most `len` characters.
pub(crate) fn truncate_hash(hash: &str, len: usize) -> &str {
    match hash.char_indices().nth(len) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
