use std::time::Duration;

use super::ShutdownTiming;
use crate::CaptureSnapshot;
use crate::Error;
use crate::Result;

/// What one attempt observed once it settled.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub timing: ShutdownTiming,
    pub snapshot: CaptureSnapshot,
    pub elapsed: Duration,
}

impl RaceOutcome {
    pub fn is_clean(&self) -> bool {
        self.snapshot.is_clean()
    }

    /// # Errors
    /// [`Error::SevereLogged`] carrying the last captured cause.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(Error::SevereLogged {
                cause: self.snapshot.cause,
            })
        }
    }
}

/// Outcomes of repeated attempts.
#[derive(Debug, Clone, Default)]
pub struct RaceReport {
    pub outcomes: Vec<RaceOutcome>,
}

impl RaceReport {
    pub fn push(
        &mut self,
        outcome: RaceOutcome,
    ) {
        self.outcomes.push(outcome);
    }

    pub fn extend(
        &mut self,
        other: RaceReport,
    ) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn attempts(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RaceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_clean())
    }

    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }

    /// First failing attempt as [`Error::SevereLogged`].
    pub fn into_result(self) -> Result<Self> {
        let first_failure = self.outcomes.iter().find(|o| !o.is_clean()).cloned();
        match first_failure {
            Some(outcome) => outcome.into_result().map(|_| self),
            None => Ok(self),
        }
    }
}
