use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::Address;
use super::GroupConfig;
use crate::Error;
use crate::Result;

/// Cluster member network and join settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberConfig {
    /// Instance name used as the member's logger prefix; generated from the
    /// port when absent
    #[serde(default)]
    pub instance_name: Option<String>,

    #[serde(default)]
    pub group: GroupConfig,

    /// Host the member advertises and, unless `socket_bind_any`, binds
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Try `port..port + port_count` when `port` is taken
    #[serde(default = "default_port_auto_increment")]
    pub port_auto_increment: bool,

    #[serde(default = "default_port_count")]
    pub port_count: u16,

    /// Broadcast discovery. Not implemented; must stay disabled.
    #[serde(default)]
    pub multicast_enabled: bool,

    /// Static address-list discovery
    #[serde(default = "default_tcp_ip_enabled")]
    pub tcp_ip_enabled: bool,

    #[serde(default)]
    pub members: Vec<Address>,

    /// Restricting to specific interfaces is not implemented; must stay disabled.
    #[serde(default)]
    pub interfaces_enabled: bool,

    /// Bind the wildcard address instead of `host`
    #[serde(default = "default_socket_bind_any")]
    pub socket_bind_any: bool,

    /// Per-peer connect timeout while joining
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            instance_name: None,
            group: GroupConfig::default(),
            host: default_host(),
            port: default_port(),
            port_auto_increment: default_port_auto_increment(),
            port_count: default_port_count(),
            multicast_enabled: false,
            tcp_ip_enabled: default_tcp_ip_enabled(),
            members: vec![],
            interfaces_enabled: false,
            socket_bind_any: default_socket_bind_any(),
            join_timeout_ms: default_join_timeout_ms(),
        }
    }
}

impl MemberConfig {
    pub fn validate(&self) -> Result<()> {
        self.group.validate()?;

        if self.port == 0 {
            return Err(Error::InvalidConfig("member port must be non-zero".into()));
        }
        if self.port_auto_increment && self.port_count == 0 {
            return Err(Error::InvalidConfig(
                "port_count must be positive when port_auto_increment is enabled".into(),
            ));
        }
        if self.multicast_enabled {
            return Err(Error::InvalidConfig(
                "multicast discovery is not supported, use tcp_ip with a static member list".into(),
            ));
        }
        if !self.tcp_ip_enabled {
            return Err(Error::InvalidConfig("tcp_ip discovery must be enabled".into()));
        }
        if self.interfaces_enabled {
            return Err(Error::InvalidConfig("interface restriction is not supported".into()));
        }
        if self.join_timeout_ms == 0 {
            return Err(Error::InvalidConfig("join_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn instance_name(&self) -> String {
        self.instance_name
            .clone()
            .unwrap_or_else(|| format!("member.{}", self.port))
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// Ports to try binding, in order
    pub fn candidate_ports(&self) -> Vec<u16> {
        if !self.port_auto_increment {
            return vec![self.port];
        }
        (0..self.port_count)
            .filter_map(|offset| self.port.checked_add(offset))
            .collect()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5701
}
fn default_port_auto_increment() -> bool {
    true
}
fn default_port_count() -> u16 {
    100
}
fn default_tcp_ip_enabled() -> bool {
    true
}
fn default_socket_bind_any() -> bool {
    true
}
fn default_join_timeout_ms() -> u64 {
    1000
}
