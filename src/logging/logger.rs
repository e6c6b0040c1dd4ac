use std::sync::Arc;

use super::LogRecord;
use super::Severity;

/// Logging capability handed to every node-internal service.
///
/// Implementations must never fail or panic: they run on the error paths of
/// the code they observe.
pub trait Logger: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn log(
        &self,
        severity: Severity,
        message: &str,
    );

    fn log_with_cause(
        &self,
        severity: Severity,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    );

    fn log_record(
        &self,
        record: LogRecord,
    );

    /// Lowest severity this logger emits
    fn level(&self) -> Severity;

    fn is_loggable(
        &self,
        severity: Severity,
    ) -> bool {
        severity != Severity::Off && severity >= self.level()
    }

    fn severe(
        &self,
        message: &str,
    ) {
        self.log(Severity::Severe, message);
    }

    fn severe_with(
        &self,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    ) {
        self.log_with_cause(Severity::Severe, message, cause);
    }

    fn warning(
        &self,
        message: &str,
    ) {
        self.log(Severity::Warning, message);
    }

    fn warning_with(
        &self,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    ) {
        self.log_with_cause(Severity::Warning, message, cause);
    }

    fn info(
        &self,
        message: &str,
    ) {
        self.log(Severity::Info, message);
    }

    fn fine(
        &self,
        message: &str,
    ) {
        self.log(Severity::Fine, message);
    }

    fn finest(
        &self,
        message: &str,
    ) {
        self.log(Severity::Finest, message);
    }
}

/// Construction point for named loggers.
pub trait LoggerFactory: Send + Sync + 'static {
    fn logger(
        &self,
        name: &str,
    ) -> Arc<dyn Logger>;
}

