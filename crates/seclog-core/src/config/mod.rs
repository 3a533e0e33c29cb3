//! Configuration for the seclog audit trail.
//!
//! A single YAML document maps onto [`AuditLogConfig`]. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.
//!
//! ```yaml
//! enabled: true
//! log_summary: true
//! storage:
//!   backend: file
//!   file_path: /var/log/seclog/activities.jsonl
//! logging:
//!   filter: info,seclog_audit=debug
//! ```

pub mod audit;

use std::fs;
use std::path::Path;

pub use audit::{AuditLogConfig, LoggingConfig, StorageBackend, StorageConfig};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AuditLogConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}
