//! Error types for the audit crate.

use thiserror::Error;

/// Errors that can occur while wiring or running the audit pipeline.
///
/// None of these escape the change handler or `stop()`; they surface only
/// from the fail-fast wiring entry points and from the capability traits.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A required argument was not provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required host service could not be resolved.
    #[error("required service not found: {0}")]
    ServiceNotFound(&'static str),

    /// Registering an activity type failed.
    #[error("failed to register activity type: {0}")]
    RegistrationFailed(String),

    /// Adding or removing a change subscription failed.
    #[error("subscription error: {0}")]
    SubscriptionFailed(String),

    /// The activity repository rejected a record.
    #[error("failed to save activity: {0}")]
    PersistenceFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
