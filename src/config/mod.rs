//! Configuration for the reconnect race harness.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base (the literal race scenario)
//! - Configuration file named by `CONFIG_PATH`
//! - Environment variable overrides (`RACE__` prefix, `__` separator)
//! - Component-wise validation
mod client;
mod member;
mod race;
mod topology;
pub use client::*;
pub use member::*;
pub use race::*;
pub use topology::*;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container
///
/// Combines all component configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HarnessConfig {
    /// Static address list shared by members and client
    #[serde(default)]
    pub topology: ClusterTopology,
    /// Credentials every node of the run presents
    #[serde(default)]
    pub group: GroupConfig,
    /// Template for every member started by the harness
    #[serde(default)]
    pub member: MemberConfig,
    /// Template for the client under test
    #[serde(default = "default_race_client")]
    pub client: ClientConfig,
    /// Race windows and timeouts
    #[serde(default)]
    pub race: RaceConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            topology: ClusterTopology::default(),
            group: GroupConfig::default(),
            member: MemberConfig::default(),
            client: default_race_client(),
            race: RaceConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("RACE__RACE__SHUTDOWN_DELAY_MS", "500");
    /// let cfg = HarnessConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.topology.validate()?;
        self.group.validate()?;
        self.member.validate()?;
        self.race.validate()?;

        // Addresses are filled from the topology when the client starts,
        // so only the rest of the client section is checked here.
        let mut client = self.client.clone();
        client.addresses = self.topology.addresses.clone();
        client.validate()?;

        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("RACE")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("topology.addresses")
}

/// Client template used by the race: unlimited attempts, 5s period, redo on.
fn default_race_client() -> ClientConfig {
    ClientConfig {
        redo_operation: true,
        connection_attempt_limit: 0,
        connection_attempt_period_ms: 5000,
        ..ClientConfig::default()
    }
}
