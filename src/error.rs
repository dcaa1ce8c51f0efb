//! Error taxonomy for the changelog pipeline.

use thiserror::Error;

/// Errors raised by source adapters and the changelog pipeline.
///
/// Every variant carries a display-ready message. The request boundary in
/// [`crate::api`] turns these into `{ "success": false, "error": ... }`
/// replies using [`ShipNoteError::status_code`].
#[derive(Error, Debug)]
pub enum ShipNoteError {
    /// Missing or empty required input (commits, repo path, URL, pasted text).
    #[error("{0}")]
    Validation(String),

    /// The local repository could not be opened or the ref range did not resolve.
    #[error("Failed to fetch commits from {path}: {message}")]
    RepositoryAccess {
        /// Path that was passed to the local adapter.
        path: String,
        /// Underlying git failure.
        message: String,
    },

    /// GitHub answered 404.
    #[error("Repository not found or you don't have access")]
    RemoteNotFound,

    /// GitHub answered 403.
    #[error("Access forbidden. Check your permissions.")]
    RemoteForbidden,

    /// Any other GitHub failure, including transport errors.
    #[error("GitHub API error: {0}")]
    RemoteApi(String),

    /// The generation backend call failed.
    #[error("{0}")]
    GenerationBackend(String),

    /// A repository URL could not be split into owner and repo. Carries the
    /// rejected input.
    #[error("Invalid GitHub URL format")]
    MalformedUrl(String),
}

/// Coarse classification of a [`ShipNoteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad or missing input.
    Validation,
    /// Local git failure.
    RepositoryAccess,
    /// GitHub 404.
    RemoteNotFound,
    /// GitHub 403.
    RemoteForbidden,
    /// Other GitHub failure.
    RemoteApi,
    /// Generation backend failure.
    GenerationBackend,
    /// Unparseable repository URL.
    MalformedUrl,
}

impl ShipNoteError {
    /// Shorthand for a [`ShipNoteError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::RepositoryAccess { .. } => ErrorKind::RepositoryAccess,
            Self::RemoteNotFound => ErrorKind::RemoteNotFound,
            Self::RemoteForbidden => ErrorKind::RemoteForbidden,
            Self::RemoteApi(_) => ErrorKind::RemoteApi,
            Self::GenerationBackend(_) => ErrorKind::GenerationBackend,
            Self::MalformedUrl(_) => ErrorKind::MalformedUrl,
        }
    }

    /// HTTP-style status used at the request boundary.
    ///
    /// Input problems (including a repository the caller cannot reach) are
    /// 400; git, GitHub transport and generation failures are 500.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation
            | ErrorKind::MalformedUrl
            | ErrorKind::RemoteNotFound
            | ErrorKind::RemoteForbidden => 400,
            ErrorKind::RepositoryAccess | ErrorKind::RemoteApi | ErrorKind::GenerationBackend => {
                500
            }
        }
    }
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ShipNoteError>;
