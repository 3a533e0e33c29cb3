//! Audit trail configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogConfig {
    /// Whether the change handler is attached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether a one-line summary is logged at info level per change.
    #[serde(default = "default_true")]
    pub log_summary: bool,

    /// Where activity records go when the host provides no repository.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Diagnostics output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Activity repository selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Repository backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Output path (for the file backend).
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Activity repository backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Keep records in process memory.
    #[default]
    Memory,
    /// Append JSON lines to a file.
    File,
    /// Print JSON lines to stdout.
    Console,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_summary: true,
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_filter() -> String {
    "info".to_string()
}
