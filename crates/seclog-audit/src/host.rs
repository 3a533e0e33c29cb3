//! Host services the lifecycle controller resolves its collaborators from.

use std::sync::Arc;

use crate::error::AuditError;
use crate::ports::{ActivityRepository, ActivityTypeRegistry, EventSource};
use crate::sink::LogSink;

/// What the host makes available to the audit trail.
///
/// Every slot is optional; the controller decides which ones are required.
#[derive(Clone, Default)]
pub struct HostServices {
    events: Option<Arc<dyn EventSource>>,
    repository: Option<Arc<dyn ActivityRepository>>,
    registry: Option<Arc<dyn ActivityTypeRegistry>>,
    log: Option<Arc<dyn LogSink>>,
}

impl HostServices {
    /// Services with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the change notification source.
    pub fn with_event_source(mut self, events: Arc<dyn EventSource>) -> Self {
        self.events = Some(events);
        self
    }

    /// Provide the repository activities are saved to.
    pub fn with_repository(mut self, repository: Arc<dyn ActivityRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Provide the activity type registry.
    pub fn with_registry(mut self, registry: Arc<dyn ActivityTypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Provide the logging backend.
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Change notification source.
    pub fn event_source(&self) -> Result<Arc<dyn EventSource>, AuditError> {
        self.events
            .clone()
            .ok_or(AuditError::ServiceNotFound("event source"))
    }

    /// Activity repository.
    pub fn repository(&self) -> Result<Arc<dyn ActivityRepository>, AuditError> {
        self.repository
            .clone()
            .ok_or(AuditError::ServiceNotFound("activity repository"))
    }

    /// Activity type registry, if the host provides one.
    pub fn registry(&self) -> Option<Arc<dyn ActivityTypeRegistry>> {
        self.registry.clone()
    }

    /// Logging backend, if the host provides one.
    pub fn log_sink(&self) -> Option<Arc<dyn LogSink>> {
        self.log.clone()
    }
}
