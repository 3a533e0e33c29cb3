//! Error types for parsing host values.

use thiserror::Error;

/// Errors raised when a textual host value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unknown access level name or malformed flag list.
    #[error("invalid access level: {0}")]
    AccessLevel(String),

    /// Content reference is not `id` or `id_version`.
    #[error("invalid content id: {0}")]
    ContentId(String),

    /// Unknown save type name.
    #[error("invalid save type: {0}")]
    SaveType(String),
}
