//! In-process change event source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use seclog_core::ChangeEvent;

use crate::error::AuditError;
use crate::ports::{ChangeHandler, EventSource, IdentityProvider, SubscriptionId};

/// Event source for hosts that raise changes from Rust code.
///
/// Handlers run synchronously on the raising thread, in subscription order.
#[derive(Default)]
pub struct LocalEventSource {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, ChangeHandler)>>,
}

impl LocalEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a change to every subscriber on behalf of `identity`.
    pub fn raise(&self, identity: &dyn IdentityProvider, event: Option<&ChangeEvent>) {
        // Snapshot so handlers may (un)subscribe without deadlocking.
        let handlers: Vec<ChangeHandler> = match self.handlers.lock() {
            Ok(handlers) => handlers.iter().map(|(_, h)| h.clone()).collect(),
            Err(e) => {
                tracing::error!("Change handlers unavailable: {}", e);
                return;
            }
        };

        for handler in handlers {
            handler(identity, event);
        }
    }

    /// Number of attached handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or_default()
    }
}

impl EventSource for LocalEventSource {
    fn subscribe(&self, handler: ChangeHandler) -> Result<SubscriptionId, AuditError> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.handlers
            .lock()
            .map_err(|e| AuditError::SubscriptionFailed(e.to_string()))?
            .push((id, handler));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), AuditError> {
        let mut handlers = self
            .handlers
            .lock()
            .map_err(|e| AuditError::SubscriptionFailed(e.to_string()))?;
        let before = handlers.len();
        handlers.retain(|(sid, _)| *sid != id);
        if handlers.len() == before {
            return Err(AuditError::SubscriptionFailed(format!(
                "no subscription {}",
                id
            )));
        }
        Ok(())
    }
}
