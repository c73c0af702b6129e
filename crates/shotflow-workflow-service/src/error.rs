//! Error types for the collaborator boundary
//!
//! Collaborator failures are caught here, logged, and surfaced once to
//! the host; graph state is never touched and no operation is retried
//! automatically.

use thiserror::Error;

/// Result type alias using ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors from the registry and execution collaborators
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The node registry could not produce a schema for a kind
    #[error("Schema fetch failed for kind '{kind}': {message}")]
    SchemaFetch { kind: String, message: String },

    /// The execution service reported a failure
    #[error("Execution service error: {0}")]
    Execution(String),
}
