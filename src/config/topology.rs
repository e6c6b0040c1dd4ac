use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use tokio::net::lookup_host;

use crate::Error;
use crate::Result;

/// `host:port` pair as written in configuration, e.g. `localhost:5800`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Resolves to a socket address, preferring IPv4 so `localhost` lands on
    /// the same loopback the members bind.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        let candidates: Vec<SocketAddr> = lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| Error::AddressResolution(self.to_string()))?
            .collect();

        candidates
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| Error::AddressResolution(self.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidConfig(format!("address `{s}` must be host:port")))?;
        if host.is_empty() {
            return Err(Error::InvalidConfig(format!("address `{s}` has an empty host")));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::InvalidConfig(format!("address `{s}` has an invalid port")))?;
        Ok(Self::new(host, port))
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Fixed, ordered peer list shared by every member and the client of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTopology {
    #[serde(default = "default_addresses")]
    pub addresses: Vec<Address>,
}

impl Default for ClusterTopology {
    fn default() -> Self {
        Self {
            addresses: default_addresses(),
        }
    }
}

impl ClusterTopology {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }

    /// `host` on each of `ports`, in order.
    pub fn local(
        host: &str,
        ports: &[u16],
    ) -> Self {
        Self::new(ports.iter().map(|p| Address::new(host, *p)).collect())
    }

    pub fn ports(&self) -> Vec<u16> {
        self.addresses.iter().map(|a| a.port).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.addresses.is_empty() {
            return Err(Error::InvalidConfig("topology must list at least one address".into()));
        }

        let mut seen = HashSet::new();
        for addr in &self.addresses {
            if addr.port == 0 {
                return Err(Error::InvalidConfig(format!("topology address {addr} has port 0")));
            }
            if !seen.insert(addr) {
                return Err(Error::InvalidConfig(format!("duplicate topology address {addr}")));
            }
        }
        Ok(())
    }
}

fn default_addresses() -> Vec<Address> {
    vec![Address::new("localhost", 5800), Address::new("localhost", 5801)]
}

/// Group credentials. Used for membership only, not as a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default = "default_group_name")]
    pub name: String,
    #[serde(default = "default_group_password")]
    pub password: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: default_group_name(),
            password: default_group_password(),
        }
    }
}

impl GroupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig("group name cannot be empty".into()));
        }
        Ok(())
    }

    pub fn matches(
        &self,
        name: &str,
        password: &str,
    ) -> bool {
        self.name == name && self.password == password
    }
}

fn default_group_name() -> String {
    "group".to_string()
}
fn default_group_password() -> String {
    "password".to_string()
}
