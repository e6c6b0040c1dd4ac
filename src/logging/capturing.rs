//! Severity-capturing logging backend.
//!
//! [`CapturingLoggerFactory`] wraps any other [`LoggerFactory`]. Each logger it
//! hands out forwards every call unchanged to the wrapped backend and, for
//! `Severe` records, flips a shared flag and keeps the cause. The harness reads
//! that flag after a race attempt settles.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::CapturedCause;
use super::LogRecord;
use super::Logger;
use super::LoggerFactory;
use super::Severity;
use super::StandardLoggerFactory;

/// State shared by every logger of one factory.
///
/// The flag is only ever set by loggers and cleared by `reset()`, so any
/// number of concurrent severe reports collapse into a single `true`.
#[derive(Debug, Default)]
pub struct CaptureState {
    severe_occurred: AtomicBool,
    severe_count: AtomicU64,
    last_severe_cause: Mutex<Option<CapturedCause>>,
}

impl CaptureState {
    pub(crate) fn record_severe(
        &self,
        cause: Option<CapturedCause>,
    ) {
        if let Some(cause) = cause {
            *self.last_severe_cause.lock() = Some(cause);
        }
        self.severe_count.fetch_add(1, Ordering::SeqCst);
        self.severe_occurred.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        let mut cause = self.last_severe_cause.lock();
        *cause = None;
        self.severe_count.store(0, Ordering::SeqCst);
        self.severe_occurred.store(false, Ordering::SeqCst);
    }

    pub fn severe_occurred(&self) -> bool {
        self.severe_occurred.load(Ordering::SeqCst)
    }

    pub fn severe_count(&self) -> u64 {
        self.severe_count.load(Ordering::SeqCst)
    }

    pub fn last_severe_cause(&self) -> Option<CapturedCause> {
        self.last_severe_cause.lock().clone()
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        let cause = self.last_severe_cause.lock().clone();
        CaptureSnapshot {
            severe_occurred: self.severe_occurred(),
            severe_count: self.severe_count(),
            cause,
        }
    }
}

/// Point-in-time copy of a [`CaptureState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub severe_occurred: bool,
    pub severe_count: u64,
    pub cause: Option<CapturedCause>,
}

impl CaptureSnapshot {
    pub fn is_clean(&self) -> bool {
        !self.severe_occurred
    }
}

/// Logger that taps severe records before delegating.
pub struct CapturingLogger {
    delegate: Arc<dyn Logger>,
    state: Arc<CaptureState>,
}

impl CapturingLogger {
    pub fn new(
        delegate: Arc<dyn Logger>,
        state: Arc<CaptureState>,
    ) -> Self {
        Self { delegate, state }
    }
}

impl Logger for CapturingLogger {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn log(
        &self,
        severity: Severity,
        message: &str,
    ) {
        if severity.is_severe() {
            self.state.record_severe(None);
        }
        self.delegate.log(severity, message);
    }

    fn log_with_cause(
        &self,
        severity: Severity,
        message: &str,
        cause: &(dyn std::error::Error + 'static),
    ) {
        if severity.is_severe() {
            self.state.record_severe(Some(CapturedCause::from_error(cause)));
        }
        self.delegate.log_with_cause(severity, message, cause);
    }

    fn log_record(
        &self,
        record: LogRecord,
    ) {
        if record.severity.is_severe() {
            self.state.record_severe(record.cause.clone());
        }
        self.delegate.log_record(record);
    }

    fn level(&self) -> Severity {
        self.delegate.level()
    }

    fn is_loggable(
        &self,
        severity: Severity,
    ) -> bool {
        self.delegate.is_loggable(severity)
    }
}

pub struct CapturingLoggerFactory {
    backend: Arc<dyn LoggerFactory>,
    state: Arc<CaptureState>,
    loggers: DashMap<String, Arc<dyn Logger>>,
}

impl CapturingLoggerFactory {
    /// Wraps `backend`; records still reach it unchanged.
    pub fn new(backend: Arc<dyn LoggerFactory>) -> Self {
        Self {
            backend,
            state: Arc::new(CaptureState::default()),
            loggers: DashMap::new(),
        }
    }

    pub fn state(&self) -> Arc<CaptureState> {
        self.state.clone()
    }

    /// Clears the captured signal. Called at the start of every race attempt.
    pub fn reset(&self) {
        self.state.reset();
    }

    pub fn severe_occurred(&self) -> bool {
        self.state.severe_occurred()
    }

    pub fn last_severe_cause(&self) -> Option<CapturedCause> {
        self.state.last_severe_cause()
    }

    pub fn severe_count(&self) -> u64 {
        self.state.severe_count()
    }

    pub fn snapshot(&self) -> CaptureSnapshot {
        self.state.snapshot()
    }
}

impl Default for CapturingLoggerFactory {
    fn default() -> Self {
        Self::new(Arc::new(StandardLoggerFactory::default()))
    }
}

impl LoggerFactory for CapturingLoggerFactory {
    fn logger(
        &self,
        name: &str,
    ) -> Arc<dyn Logger> {
        self.loggers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CapturingLogger::new(self.backend.logger(name), self.state.clone())))
            .value()
            .clone()
    }
}
