//! Logging sinks.
//!
//! The pipeline logs through [`LogSink`] rather than calling `tracing`
//! directly so a host can hand in its own backend. [`TracingSink`] forwards
//! to `tracing`; [`NullSink`] is used when no backend was provided, which
//! keeps every call site free of "is logging wired?" checks.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Mutex;

use tracing::span::EnteredSpan;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained tracing output.
    Trace,
    /// Diagnostics such as stored activity ids.
    Debug,
    /// Per-change summary lines and lifecycle transitions.
    Info,
    /// Degraded but working.
    Warn,
    /// A change went unrecorded or wiring failed.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Guard returned by [`LogSink::begin_scope`]. The scope ends when dropped.
#[derive(Debug, Default)]
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct LogScope {
    span: Option<EnteredSpan>,
}

impl LogScope {
    /// A scope that does nothing.
    pub fn noop() -> Self {
        Self::default()
    }

    /// A scope backed by an entered `tracing` span.
    pub fn entered(span: EnteredSpan) -> Self {
        Self { span: Some(span) }
    }

    /// Whether this scope carries a live span.
    pub fn is_active(&self) -> bool {
        self.span.is_some()
    }
}

/// A logging backend.
pub trait LogSink: Send + Sync {
    /// Whether lines at `level` would be recorded.
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Record a line, optionally with the error that caused it.
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn StdError + 'static)>);

    /// Open a scope; lines logged while the guard lives belong to it.
    fn begin_scope(&self, state: &str) -> LogScope;
}

/// Forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Sink writing to the current `tracing` subscriber.
    pub fn new() -> Self {
        Self
    }
}

macro_rules! emit {
    ($level:ident, $message:expr, $error:expr) => {
        match $error {
            Some(err) => tracing::$level!(error = %err, "{}", $message),
            None => tracing::$level!("{}", $message),
        }
    };
}

impl LogSink for TracingSink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(tracing::Level::TRACE),
            LogLevel::Debug => tracing::enabled!(tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }

    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn StdError + 'static)>) {
        match level {
            LogLevel::Trace => emit!(trace, message, error),
            LogLevel::Debug => emit!(debug, message, error),
            LogLevel::Info => emit!(info, message, error),
            LogLevel::Warn => emit!(warn, message, error),
            LogLevel::Error => emit!(error, message, error),
        }
    }

    fn begin_scope(&self, state: &str) -> LogScope {
        LogScope::entered(tracing::info_span!("seclog", scope = %state).entered())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn is_enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn log(&self, _level: LogLevel, _message: &str, _error: Option<&(dyn StdError + 'static)>) {}

    fn begin_scope(&self, _state: &str) -> LogScope {
        LogScope::noop()
    }
}

/// A line captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub error: Option<String>,
}

/// Keeps every line in memory. Useful for hosts that surface recent
/// diagnostics themselves, and for tests.
#[derive(Debug)]
pub struct MemorySink {
    min_level: LogLevel,
    entries: Mutex<Vec<LogEntry>>,
    scopes: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Record lines at `min_level` and above.
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            entries: Mutex::new(Vec::new()),
            scopes: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of captured lines.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Captured lines at exactly `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|entry| entry.level == level).count())
            .unwrap_or_default()
    }

    /// States passed to `begin_scope`, in call order.
    pub fn scopes(&self) -> Vec<String> {
        self.scopes.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(LogLevel::Trace)
    }
}

impl LogSink for MemorySink {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn StdError + 'static)>) {
        if !self.is_enabled(level) {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                message: message.to_string(),
                error: error.map(|e| e.to_string()),
            });
        }
    }

    fn begin_scope(&self, state: &str) -> LogScope {
        if let Ok(mut scopes) = self.scopes.lock() {
            scopes.push(state.to_string());
        }
        LogScope::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_is_never_enabled() {
        let sink = NullSink;
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert!(!sink.is_enabled(level));
        }

        sink.log(LogLevel::Error, "dropped", None);
        let scope = sink.begin_scope("state");
        assert!(!scope.is_active());
        drop(scope);
    }

    #[test]
    fn test_memory_sink_filters_by_level() {
        let sink = MemorySink::new(LogLevel::Info);
        sink.log(LogLevel::Debug, "hidden", None);
        sink.log(LogLevel::Info, "shown", None);

        let err = std::io::Error::other("disk full");
        sink.log(LogLevel::Error, "failed", Some(&err));

        assert!(!sink.is_enabled(LogLevel::Debug));
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.count(LogLevel::Error), 1);
        assert_eq!(sink.entries()[1].error.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_memory_sink_records_scopes() {
        let sink = MemorySink::default();
        let _scope = sink.begin_scope("event 1");
        assert_eq!(sink.scopes(), vec!["event 1".to_string()]);
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        let sink = TracingSink::new();
        sink.log(LogLevel::Info, "nobody listens", None);
        let err = std::io::Error::other("boom");
        sink.log(LogLevel::Error, "still fine", Some(&err));

        let scope = sink.begin_scope("state");
        assert!(scope.is_active());
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }
}
