//! The audit service: turns change events into stored activities.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::{Handle, RuntimeFlavor};
use uuid::Uuid;

use seclog_core::{ActivityId, ChangeEvent};

use crate::error::AuditError;
use crate::ports::{change_handler, ActivityRepository, ChangeHandler, IdentityProvider};
use crate::record::{build_record, summary_line};
use crate::sink::{LogLevel, LogSink};

/// Records access-control changes in the activity repository.
///
/// [`record_access_change`](Self::record_access_change) runs inside the
/// host's save pipeline, so it never returns an error and never panics on a
/// failed save: failures are logged and the change stays unrecorded.
pub struct AuditService {
    repository: Arc<dyn ActivityRepository>,
    log: Arc<dyn LogSink>,
    log_summary: bool,
}

impl AuditService {
    /// Create a new audit service.
    pub fn new(repository: Arc<dyn ActivityRepository>, log: Arc<dyn LogSink>) -> Self {
        Self {
            repository,
            log,
            log_summary: true,
        }
    }

    /// Toggle the info-level summary line.
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.log_summary = enabled;
        self
    }

    /// Record one change made by the principal `identity` resolves to.
    ///
    /// The save is awaited before returning; there is no retry.
    pub fn record_access_change(&self, identity: &dyn IdentityProvider, event: Option<&ChangeEvent>) {
        let Some(event) = event else {
            self.log.log(
                LogLevel::Error,
                "change handler called without a change event",
                None,
            );
            return;
        };

        let _scope = self
            .log
            .begin_scope(&format!("content_security_saved {}", Uuid::new_v4()));

        match self.try_record(identity.current_name(), event) {
            Ok(id) => {
                if self.log.is_enabled(LogLevel::Debug) {
                    self.log.log(
                        LogLevel::Debug,
                        &format!("New activity saved with id: {}.", id),
                        None,
                    );
                }
            }
            Err(err) => {
                self.log.log(
                    LogLevel::Error,
                    "failed to handle content security saved event",
                    Some(&err),
                );
            }
        }
    }

    fn try_record(&self, actor: &str, event: &ChangeEvent) -> Result<ActivityId, AuditError> {
        if self.log_summary && self.log.is_enabled(LogLevel::Info) {
            self.log.log(LogLevel::Info, &summary_line(actor, event), None);
        }

        let record = build_record(actor, event);
        let save = async { self.repository.save(record).await };
        wait_for(AssertUnwindSafe(save).catch_unwind())
            .unwrap_or_else(|panic| Err(AuditError::PersistenceFailed(panic_message(&*panic))))
    }

    /// Handler to subscribe to an [`EventSource`](crate::ports::EventSource).
    pub fn handler(self: Arc<Self>) -> ChangeHandler {
        change_handler(move |identity, event| self.record_access_change(identity, event))
    }
}

/// Drive `future` to completion from synchronous code.
///
/// On a multi-threaded tokio runtime the worker is moved off the scheduler
/// first; anywhere else (no runtime, current-thread runtime) a local
/// executor polls it.
fn wait_for<F: Future>(future: F) -> F::Output {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        _ => futures::executor::block_on(future),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("repository panicked: {}", detail)
}
