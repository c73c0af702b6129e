//! Error types for the graph engine

use thiserror::Error;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors from the few fallible graph-engine operations
///
/// The core derivation, resolution, conversion, and validation paths are
/// total and never return these; they arise only from palette lookups
/// and preset parsing.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A palette lookup referenced an unregistered node kind
    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
