use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Timing parameters of a race attempt.
///
/// These are the race windows themselves: widen or narrow them when the
/// observed flakiness says the shutdown is landing outside the reconnect loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Wait between member shutdown and client shutdown for the delayed variant
    #[serde(default = "default_shutdown_delay_ms")]
    pub shutdown_delay_ms: u64,

    /// Quiescence after client shutdown before the capture state is read
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Outer bound for one whole attempt
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// Bound for each individual start/shutdown call
    #[serde(default = "default_lifecycle_timeout_ms")]
    pub lifecycle_timeout_ms: u64,

    #[serde(default = "default_attempts_per_variant")]
    pub attempts_per_variant: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            shutdown_delay_ms: default_shutdown_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            lifecycle_timeout_ms: default_lifecycle_timeout_ms(),
            attempts_per_variant: default_attempts_per_variant(),
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.attempts_per_variant == 0 {
            return Err(Error::InvalidConfig("attempts_per_variant must be at least 1".into()));
        }
        if self.lifecycle_timeout_ms == 0 {
            return Err(Error::InvalidConfig("lifecycle_timeout_ms must be positive".into()));
        }
        let minimum = self
            .shutdown_delay_ms
            .checked_add(self.settle_delay_ms)
            .ok_or_else(|| Error::InvalidConfig("shutdown_delay_ms + settle_delay_ms overflows".into()))?;
        if self.attempt_timeout_ms <= minimum {
            return Err(Error::InvalidConfig(format!(
                "attempt_timeout_ms ({}) must exceed shutdown_delay_ms + settle_delay_ms ({})",
                self.attempt_timeout_ms, minimum
            )));
        }
        Ok(())
    }

    pub fn shutdown_delay(&self) -> Duration {
        Duration::from_millis(self.shutdown_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn lifecycle_timeout(&self) -> Duration {
        Duration::from_millis(self.lifecycle_timeout_ms)
    }
}

fn default_shutdown_delay_ms() -> u64 {
    3000
}
fn default_settle_delay_ms() -> u64 {
    1000
}
fn default_attempt_timeout_ms() -> u64 {
    60_000
}
fn default_lifecycle_timeout_ms() -> u64 {
    15_000
}
fn default_attempts_per_variant() -> u32 {
    1
}
