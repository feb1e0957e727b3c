use std::sync::{Arc, RwLock};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::ErrorTrackingConfig;
use crate::report::{exception_chain, ExceptionReport, User};
use crate::sink::ReportSink;

pub struct ErrorTracker {
    config: ErrorTrackingConfig,
    sink: Arc<dyn ReportSink + Send + Sync>,
    user: RwLock<Option<User>>,
    enabled: bool,
}

impl ErrorTracker {
    /// Reports are only handed to `sink` when the config carries a DSN.
    pub fn init(config: ErrorTrackingConfig, sink: impl ReportSink + Send + Sync + 'static) -> Self {
        let enabled = config.sentry_dsn.as_deref().is_some_and(|dsn| !dsn.is_empty());
        if !enabled {
            tracing::info!("no DSN configured, error reports will not be sent");
        }

        ErrorTracker {
            config,
            sink: Arc::new(sink),
            user: RwLock::new(None),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Attaches `user` to every report captured from now on.
    pub fn identify(&self, user: User) {
        tracing::debug!(user_id = %user.id, "identified user");
        match self.user.write() {
            Ok(mut guard) => *guard = Some(user),
            Err(poisoned) => *poisoned.into_inner() = Some(user),
        }
    }

    /// Reports `error` with its source chain and returns the report id.
    /// Outside production the error is logged as well.
    pub fn capture_exception<E>(&self, error: &E) -> Uuid
    where
        E: std::error::Error + ?Sized + 'static,
    {
        if !self.config.is_production() {
            tracing::error!(error = %error, "captured exception");
        }

        let user = match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        let report = ExceptionReport {
            event_id: Uuid::now_v7(),
            timestamp: OffsetDateTime::now_utc(),
            environment: self.config.environment.clone(),
            release: self.config.release.clone(),
            user,
            exception: exception_chain(error),
        };
        let event_id = report.event_id;

        if self.config.debug {
            tracing::debug!(event_id = %event_id, "exception report: {:?}", report);
        }
        if self.enabled {
            self.sink.send(report);
        }

        event_id
    }
}
