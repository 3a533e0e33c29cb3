//! # seclog-audit
//!
//! Records access-control changes as content security activities.
//!
//! The pipeline, leaves first:
//!
//! - [`activity`]: the `ContentSecurity` activity type and its idempotent
//!   registration.
//! - [`record`]: pure translation of a [`ChangeEvent`](seclog_core::ChangeEvent)
//!   into an ordered [`ActivityRecord`](seclog_core::ActivityRecord).
//! - [`sink`]: logging backends, including the no-op [`NullSink`].
//! - [`service`]: [`AuditService`], which builds, saves and logs one record
//!   per change and contains every failure.
//! - [`lifecycle`]: [`AuditLogModule`], which attaches the service to the
//!   host's change notifications exactly once.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use seclog_audit::{
//!     AuditLogModule, CallerContext, HostServices, LifecycleState, LocalEventSource,
//!     MemoryActivityRepository, MemoryTypeRegistry,
//! };
//! use seclog_core::{AuditLogConfig, ChangeEvent, ContentId, SaveType};
//!
//! let events = Arc::new(LocalEventSource::new());
//! let repository = Arc::new(MemoryActivityRepository::new());
//! let services = HostServices::new()
//!     .with_event_source(events.clone())
//!     .with_repository(repository.clone())
//!     .with_registry(Arc::new(MemoryTypeRegistry::new()));
//!
//! let module = AuditLogModule::new(AuditLogConfig::default());
//! assert_eq!(module.start(&services), LifecycleState::Attached);
//!
//! let event = ChangeEvent::new(ContentId::new(42), SaveType::Modify);
//! events.raise(&CallerContext::new("alice"), Some(&event));
//! assert_eq!(repository.len(), 1);
//!
//! module.stop();
//! ```

pub mod activity;
pub mod error;
pub mod events;
pub mod host;
pub mod lifecycle;
pub mod ports;
pub mod record;
pub mod registry;
pub mod service;
pub mod sink;
pub mod storage;

pub use activity::{content_security_activity_type, register_activity_type};
pub use error::AuditError;
pub use events::LocalEventSource;
pub use host::HostServices;
pub use lifecycle::{AuditLogModule, LifecycleState};
pub use ports::{
    change_handler, ActivityRepository, ActivityTypeRegistry, CallerContext, ChangeHandler,
    EventSource, IdentityProvider, SubscriptionId,
};
pub use record::{build_record, summary_line};
pub use registry::MemoryTypeRegistry;
pub use service::AuditService;
pub use sink::{LogEntry, LogLevel, LogScope, LogSink, MemorySink, NullSink, TracingSink};
pub use storage::{
    create_repository, ConsoleActivityRepository, FileActivityRepository,
    MemoryActivityRepository, StoredActivity,
};
