//! Default backend: forwards every record to `tracing`.

use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::CapturedCause;
use super::LogRecord;
use super::Logger;
use super::LoggerFactory;
use super::Severity;

pub struct StandardLogger {
    name: String,
    level: Severity,
}

impl StandardLogger {
    pub fn new(
        name: impl Into<String>,
        level: Severity,
    ) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    fn emit(
        &self,
        severity: Severity,
        message: &str,
        cause: Option<&CapturedCause>,
    ) {
        if !self.is_loggable(severity) {
            return;
        }
        let logger = self.name.as_str();
        match (severity, cause) {
            (Severity::Severe, Some(c)) => error!(logger, cause = %c, "{}", message),
            (Severity::Severe, None) => error!(logger, "{}", message),
            (Severity::Warning, Some(c)) => warn!(logger, cause = %c, "{}", message),
            (Severity::Warning, None) => warn!(logger, "{}", message),
            (Severity::Info, Some(c)) => info!(logger, cause = %c, "{}", message),
            (Severity::Info, None) => info!(logger, "{}", message),
            (Severity::Fine, Some(c)) => debug!(logger, cause = %c, "{}", message),
            (Severity::Fine, None) => debug!(logger, "{}", message),
            (Severity::Finest, Some(c)) => trace!(logger, cause = %c, "{}", message),
            (Severity::Finest, None) => trace!(logger, "{}", message),
            (Severity::Off, _) => {}
        }
    }
}

impl Logger for StandardLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(
        &self,
        severity: Severity,
        message: &str,
    ) {
        self.emit(severity, message, None);
    }

    fn log_with_cause(
        &self,
        severity: Severity,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    ) {
        if self.is_loggable(severity) {
            self.emit(severity, message, Some(&CapturedCause::from_error(cause)));
        }
    }

    fn log_record(
        &self,
        record: LogRecord,
    ) {
        self.emit(record.severity, &record.message, record.cause.as_ref());
    }

    fn level(&self) -> Severity {
        self.level
    }
}

/// Unaudited logging, used by members and by anything built before a
/// capturing backend is installed.
#[derive(Debug, Clone, Copy)]
pub struct StandardLoggerFactory {
    level: Severity,
}

impl StandardLoggerFactory {
    pub fn new(level: Severity) -> Self {
        Self { level }
    }
}

impl Default for StandardLoggerFactory {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl LoggerFactory for StandardLoggerFactory {
    fn logger(
        &self,
        name: &str,
    ) -> Arc<dyn Logger> {
        Arc::new(StandardLogger::new(name, self.level))
    }
}
