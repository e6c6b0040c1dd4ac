use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::Address;
use super::GroupConfig;
use crate::Error;
use crate::Result;

/// Client connection and reconnection settings.
///
/// The combination `redo_operation = true`, `connection_attempt_limit = 0`
/// keeps a client retrying forever once its cluster is gone, which is the
/// window the race harness aims its shutdown at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub group: GroupConfig,

    #[serde(default)]
    pub addresses: Vec<Address>,

    /// Retry in-flight invocations on a reconnected member instead of failing them
    #[serde(default)]
    pub redo_operation: bool,

    /// Connection rounds before giving up (0 means unlimited)
    #[serde(default = "default_connection_attempt_limit")]
    pub connection_attempt_limit: u32,

    /// Pause between connection rounds (unit: milliseconds)
    #[serde(default = "default_connection_attempt_period_ms")]
    pub connection_attempt_period_ms: u64,

    /// TCP connect plus authentication timeout per address
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Upper bound for a single invocation, redo included
    #[serde(default = "default_invocation_timeout_ms")]
    pub invocation_timeout_ms: u64,

    #[serde(default = "default_partition_refresh_interval_ms")]
    pub partition_refresh_interval_ms: u64,

    /// Randomise address order on each connection round
    #[serde(default)]
    pub shuffle_member_list: bool,

    /// Bound on waiting for background services during shutdown
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            group: GroupConfig::default(),
            addresses: vec![],
            redo_operation: false,
            connection_attempt_limit: default_connection_attempt_limit(),
            connection_attempt_period_ms: default_connection_attempt_period_ms(),
            connection_timeout_ms: default_connection_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            invocation_timeout_ms: default_invocation_timeout_ms(),
            partition_refresh_interval_ms: default_partition_refresh_interval_ms(),
            shuffle_member_list: false,
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        self.group.validate()?;

        if self.addresses.is_empty() {
            return Err(Error::InvalidConfig("client needs at least one address".into()));
        }
        for (name, value) in [
            ("connection_attempt_period_ms", self.connection_attempt_period_ms),
            ("connection_timeout_ms", self.connection_timeout_ms),
            ("heartbeat_interval_ms", self.heartbeat_interval_ms),
            ("invocation_timeout_ms", self.invocation_timeout_ms),
            ("partition_refresh_interval_ms", self.partition_refresh_interval_ms),
            ("shutdown_timeout_ms", self.shutdown_timeout_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn is_attempt_limited(&self) -> bool {
        self.connection_attempt_limit > 0
    }

    pub fn connection_attempt_period(&self) -> Duration {
        Duration::from_millis(self.connection_attempt_period_ms)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation_timeout_ms)
    }

    pub fn partition_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.partition_refresh_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

fn default_connection_attempt_limit() -> u32 {
    2
}
fn default_connection_attempt_period_ms() -> u64 {
    3000
}
fn default_connection_timeout_ms() -> u64 {
    5000
}
fn default_heartbeat_interval_ms() -> u64 {
    1000
}
fn default_invocation_timeout_ms() -> u64 {
    120_000
}
fn default_partition_refresh_interval_ms() -> u64 {
    10_000
}
fn default_shutdown_timeout_ms() -> u64 {
    5000
}
