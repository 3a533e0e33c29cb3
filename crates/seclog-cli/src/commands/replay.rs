//! `seclog replay` command implementation.
//!
//! Feeds recorded change events through the same wiring a host would use:
//! a local event source, an in-memory type registry, the configured
//! repository and the `tracing` sink.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use seclog_audit::{
    create_repository, ActivityRepository, AuditLogModule, CallerContext, HostServices,
    LifecycleState, LocalEventSource, MemoryActivityRepository, MemoryTypeRegistry, TracingSink,
};
use seclog_core::{AuditLogConfig, ChangeEvent, StorageBackend};

/// Outcome of a replay.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Lines delivered to the event source.
    pub raised: usize,
    /// Activities kept in memory (memory backend only).
    pub stored: Option<usize>,
}

pub fn run(config: &AuditLogConfig, events_path: &Path, actor: &str) -> Result<()> {
    let summary = replay(config, events_path, actor)?;
    match summary.stored {
        Some(stored) => println!("replayed {} events, stored {} activities", summary.raised, stored),
        None => println!("replayed {} events", summary.raised),
    }
    Ok(())
}

pub fn replay(config: &AuditLogConfig, events_path: &Path, actor: &str) -> Result<ReplaySummary> {
    replay_through(config, Arc::new(LocalEventSource::new()), events_path, actor)
}

/// Replay through `events`. The audit handler is detached again before
/// returning, also when a line fails to parse.
fn replay_through(
    config: &AuditLogConfig,
    events: Arc<LocalEventSource>,
    events_path: &Path,
    actor: &str,
) -> Result<ReplaySummary> {
    let file = File::open(events_path)
        .with_context(|| format!("failed to open {}", events_path.display()))?;

    let memory = match config.storage.backend {
        StorageBackend::Memory => Some(Arc::new(MemoryActivityRepository::new())),
        _ => None,
    };
    let repository: Arc<dyn ActivityRepository> = match &memory {
        Some(memory) => memory.clone(),
        None => create_repository(&config.storage)?,
    };

    let services = HostServices::new()
        .with_event_source(events.clone())
        .with_repository(repository)
        .with_registry(Arc::new(MemoryTypeRegistry::new()))
        .with_log_sink(Arc::new(TracingSink::new()));

    let module = AuditLogModule::new(config.clone());
    module
        .attach(&services)
        .context("failed to attach audit log")?;
    if module.state() == LifecycleState::Unattached {
        tracing::warn!("audit logging is disabled, replayed events will not be recorded");
    }

    let raised = raise_all(&events, BufReader::new(file), events_path, actor);
    module.stop();

    let mut summary = ReplaySummary {
        raised: raised?,
        stored: None,
    };

    if let Some(memory) = memory {
        for activity in memory.activities() {
            println!("{}", serde_json::to_string(&activity)?);
        }
        summary.stored = Some(memory.len());
    }

    tracing::info!(raised = summary.raised, "replay finished");
    Ok(summary)
}

/// Raise every non-blank line of `reader` as a change event made by `actor`.
fn raise_all(
    events: &LocalEventSource,
    reader: impl BufRead,
    events_path: &Path,
    actor: &str,
) -> Result<usize> {
    let caller = CallerContext::new(actor);
    let mut raised = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", events_path.display()))?;
        if line.trim().is_empty() {
            continue;
        }

        let event: Option<ChangeEvent> = serde_json::from_str(&line).with_context(|| {
            format!("{}:{}: invalid change event", events_path.display(), index + 1)
        })?;
        events.raise(&caller, event.as_ref());
        raised += 1;
    }

    Ok(raised)
}
