//! Capabilities the audit pipeline consumes from its host.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use seclog_core::{ActivityId, ActivityRecord, ActivityType, ChangeEvent};

use crate::error::AuditError;

/// Supplies the display name of the caller on whose behalf a change is made.
///
/// Passed explicitly into every handler invocation by whoever raises the
/// change, and read once per event.
pub trait IdentityProvider {
    /// Display name of the current principal.
    fn current_name(&self) -> &str;
}

/// Caller context carrying an already-resolved principal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    name: String,
}

impl CallerContext {
    /// Context for the named principal.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl IdentityProvider for CallerContext {
    fn current_name(&self) -> &str {
        &self.name
    }
}

/// Callback invoked for each access-control change.
///
/// The event is `None` when the host raised the notification without a
/// payload.
pub type ChangeHandler = Arc<dyn Fn(&dyn IdentityProvider, Option<&ChangeEvent>) + Send + Sync>;

/// Wrap a closure as a [`ChangeHandler`].
pub fn change_handler<F>(f: F) -> ChangeHandler
where
    F: Fn(&dyn IdentityProvider, Option<&ChangeEvent>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handle returned by [`EventSource::subscribe`], released by
/// [`EventSource::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of access-control change notifications.
pub trait EventSource: Send + Sync {
    /// Add a handler; it is invoked synchronously for every change.
    fn subscribe(&self, handler: ChangeHandler) -> Result<SubscriptionId, AuditError>;

    /// Remove a previously added handler.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), AuditError>;
}

/// Registry of activity type descriptors.
pub trait ActivityTypeRegistry: Send + Sync {
    /// Add or replace the descriptor with the same name.
    fn register(&self, activity_type: ActivityType) -> Result<(), AuditError>;
}

/// Persistence for activity records.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Store a record and return its identifier.
    async fn save(&self, record: ActivityRecord) -> Result<ActivityId, AuditError>;
}
