//! Error types for notescope.

use thiserror::Error;

/// Result type alias using notescope's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notescope operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Failure reported by an external collaborator (workspace or search
    /// service). Displays as the collaborator's own message so it can be
    /// shown to the user verbatim.
    #[error("{0}")]
    Service(String),

    /// Workspace does not exist or is not visible to the caller
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Neither the requested nor the personal workspace could be resolved
    #[error("Workspace resolution failed for '{requested}': {reason}")]
    WorkspaceResolution { requested: String, reason: String },

    /// Tag universe could not be fetched
    #[error("Tag fetch error: {0}")]
    TagFetch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (e.g. no async runtime to run a reload on)
    #[error("Internal error: {0}")]
    Internal(String),
}
