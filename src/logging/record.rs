use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Log severity, ordered from least to most severe.
///
/// `Off` sorts above `Severe` so a logger whose level is `Off` reports no
/// severity as loggable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Finest,
    Fine,
    Info,
    Warning,
    Severe,
    Off,
}

impl Severity {
    pub fn is_severe(self) -> bool {
        self == Severity::Severe
    }

    /// Equivalent `tracing` level. `Off` has none.
    pub fn as_tracing_level(self) -> Option<tracing::Level> {
        match self {
            Severity::Finest => Some(tracing::Level::TRACE),
            Severity::Fine => Some(tracing::Level::DEBUG),
            Severity::Info => Some(tracing::Level::INFO),
            Severity::Warning => Some(tracing::Level::WARN),
            Severity::Severe => Some(tracing::Level::ERROR),
            Severity::Off => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Severity::Finest => "FINEST",
            Severity::Fine => "FINE",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Severe => "SEVERE",
            Severity::Off => "OFF",
        };
        f.write_str(s)
    }
}

/// Owned snapshot of an error and its `source()` chain.
///
/// Errors raised inside node tasks do not outlive those tasks, so the sink
/// keeps their rendered text instead of the error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCause {
    pub message: String,
    pub chain: Vec<String>,
}

impl CapturedCause {
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(s) = source {
            chain.push(s.to_string());
            source = s.source();
        }
        Self {
            message: error.to_string(),
            chain,
        }
    }
}

impl fmt::Display for CapturedCause {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for s in &self.chain {
            write!(f, ": caused by: {s}")?;
        }
        Ok(())
    }
}

/// A single log call, as seen by a [`Logger`](super::Logger).
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub logger_name: String,
    pub severity: Severity,
    pub message: String,
    pub cause: Option<CapturedCause>,
}

impl LogRecord {
    pub fn new(
        logger_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            logger_name: logger_name.into(),
            severity,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        mut self,
        cause: CapturedCause,
    ) -> Self {
        self.cause = Some(cause);
        self
    }
}
