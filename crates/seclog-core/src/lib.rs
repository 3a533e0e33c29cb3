//! # seclog-core
//!
//! Shared types for the seclog audit trail.
//!
//! - [`ChangeEvent`] and friends describe an access-control change raised by
//!   the content host (what was changed, how, and the resulting permission
//!   entries).
//! - [`ActivityRecord`] is the unit handed to an activity repository: an
//!   action code plus an insertion-ordered key/value mapping.
//! - [`ActivityType`] is the descriptor a repository uses to decode records.
//! - [`config`] holds the YAML-backed configuration.

pub mod activity;
pub mod config;
pub mod error;
pub mod security;

pub use activity::{
    ActionType, ActivityData, ActivityId, ActivityRecord, ActivityType,
    CONTENT_SECURITY_ACTIVITY,
};
pub use config::{AuditLogConfig, ConfigError, LoggingConfig, StorageBackend, StorageConfig};
pub use error::ParseError;
pub use security::{AccessLevel, ChangeEvent, ContentId, EntityType, PermissionEntry, SaveType};
