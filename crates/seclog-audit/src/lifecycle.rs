//! Attaching the audit service to the host's change notifications.
//!
//! Hosts reach the controller through one of two entry points:
//!
//! - [`AuditLogModule::attach`] for the always-run builder path. Fails fast
//!   when a required service is missing.
//! - [`AuditLogModule::start`] for the optional module path. Never fails; a
//!   wiring problem is logged and the controller stays unattached.
//!
//! Both register the activity type (an idempotent upsert) and both are
//! guarded by the same state, so calling either, or both, subscribes the
//! handler at most once.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use seclog_core::AuditLogConfig;

use crate::activity::register_activity_type;
use crate::error::AuditError;
use crate::host::HostServices;
use crate::ports::{EventSource, SubscriptionId};
use crate::service::AuditService;
use crate::sink::{LogLevel, LogSink, NullSink};

/// Whether the change handler is currently subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unattached,
    Attached,
}

struct Attachment {
    events: Arc<dyn EventSource>,
    subscription: SubscriptionId,
}

/// Lifecycle controller for the audit trail.
pub struct AuditLogModule {
    config: AuditLogConfig,
    log: OnceLock<Arc<dyn LogSink>>,
    attachment: Mutex<Option<Attachment>>,
}

impl AuditLogModule {
    /// Create an unattached controller.
    pub fn new(config: AuditLogConfig) -> Self {
        Self {
            config,
            log: OnceLock::new(),
            attachment: Mutex::new(None),
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        match *self.lock() {
            Some(_) => LifecycleState::Attached,
            None => LifecycleState::Unattached,
        }
    }

    /// Register the activity type and subscribe the audit handler.
    ///
    /// Returns `Ok(())` without doing anything when already attached or when
    /// the configuration disables the audit trail. On error nothing is
    /// subscribed.
    pub fn attach(&self, services: &HostServices) -> Result<(), AuditError> {
        let log = self.resolve_log(services);
        let mut attachment = self.lock();

        if attachment.is_some() {
            log.log(LogLevel::Debug, "audit log already attached", None);
            return Ok(());
        }

        if !self.config.enabled {
            log.log(
                LogLevel::Info,
                "audit logging disabled by configuration",
                None,
            );
            return Ok(());
        }

        let connected = self.connect(services, &log)?;
        if log.is_enabled(LogLevel::Info) {
            log.log(
                LogLevel::Info,
                &format!(
                    "audit logging attached, subscription {}",
                    connected.subscription
                ),
                None,
            );
        }
        *attachment = Some(connected);
        Ok(())
    }

    /// Like [`attach`](Self::attach), but logs failures instead of returning
    /// them.
    pub fn start(&self, services: &HostServices) -> LifecycleState {
        if let Err(err) = self.attach(services) {
            self.resolve_log(services).log(
                LogLevel::Error,
                "audit log initialization failed, audit logging not active",
                Some(&err),
            );
        }
        self.state()
    }

    /// Unsubscribe the audit handler. Never fails.
    ///
    /// If the event source refuses the unsubscription the controller stays
    /// attached so a later call can retry.
    pub fn stop(&self) {
        let log = self.current_log();
        let mut attachment = self.lock();

        let Some(current) = attachment.take() else {
            log.log(
                LogLevel::Debug,
                "stop called but no change handler was attached",
                None,
            );
            return;
        };

        match current.events.unsubscribe(current.subscription) {
            Ok(()) => log.log(LogLevel::Info, "audit logging detached", None),
            Err(err) => {
                log.log(
                    LogLevel::Error,
                    "failed to detach change handler",
                    Some(&err),
                );
                *attachment = Some(current);
            }
        }
    }

    fn connect(
        &self,
        services: &HostServices,
        log: &Arc<dyn LogSink>,
    ) -> Result<Attachment, AuditError> {
        let registry = services.registry();
        register_activity_type(registry.as_deref())?;

        let repository = services.repository()?;
        let events = services.event_source()?;

        let service = Arc::new(
            AuditService::new(repository, log.clone()).with_summary(self.config.log_summary),
        );
        let subscription = events.subscribe(service.handler())?;

        Ok(Attachment {
            events,
            subscription,
        })
    }

    /// Sink from the first services seen, or the null sink.
    fn resolve_log(&self, services: &HostServices) -> Arc<dyn LogSink> {
        self.log
            .get_or_init(|| services.log_sink().unwrap_or_else(|| Arc::new(NullSink)))
            .clone()
    }

    fn current_log(&self) -> Arc<dyn LogSink> {
        self.log
            .get()
            .cloned()
            .unwrap_or_else(|| Arc::new(NullSink))
    }

    // The slot is only ever replaced whole, so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, Option<Attachment>> {
        self.attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
