use std::sync::Arc;

use parking_lot::Mutex;

use crate::CapturedCause;
use crate::LogRecord;
use crate::Logger;
use crate::LoggerFactory;
use crate::Severity;

/// Backend that keeps every record it receives, for asserting what reached
/// the delegate of a capturing logger.
#[derive(Default)]
pub struct RecordingLoggerFactory {
    pub level: Option<Severity>,
    pub records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingLoggerFactory {
    pub fn with_level(level: Severity) -> Self {
        Self {
            level: Some(level),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn count(
        &self,
        severity: Severity,
    ) -> usize {
        self.records.lock().iter().filter(|r| r.severity == severity).count()
    }
}

impl LoggerFactory for RecordingLoggerFactory {
    fn logger(
        &self,
        name: &str,
    ) -> Arc<dyn Logger> {
        Arc::new(RecordingLogger {
            name: name.to_string(),
            level: self.level.unwrap_or(Severity::Finest),
            records: self.records.clone(),
        })
    }
}

pub struct RecordingLogger {
    name: String,
    level: Severity,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl Logger for RecordingLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(
        &self,
        severity: Severity,
        message: &str,
    ) {
        self.records.lock().push(LogRecord::new(&self.name, severity, message));
    }

    fn log_with_cause(
        &self,
        severity: Severity,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    ) {
        self.records
            .lock()
            .push(LogRecord::new(&self.name, severity, message).with_cause(CapturedCause::from_error(cause)));
    }

    fn log_record(
        &self,
        record: LogRecord,
    ) {
        self.records.lock().push(record);
    }

    fn level(&self) -> Severity {
        self.level
    }
}
