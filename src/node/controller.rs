//! Starts and stops the members and the client of a race attempt.
//!
//! Every node of one controller shares the same static topology and group
//! credentials. Members log through the standard backend; the client logs
//! through whatever factory the caller hands in, normally the capturing one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::NodeHandle;
use crate::Address;
use crate::ClientBuilder;
use crate::ClientConfig;
use crate::ClusterTopology;
use crate::Error;
use crate::GroupConfig;
use crate::HarnessConfig;
use crate::LoggerFactory;
use crate::MemberBuilder;
use crate::MemberConfig;
use crate::Result;
use crate::StandardLoggerFactory;

pub struct NodeController {
    topology: ClusterTopology,
    group: GroupConfig,
    member_template: MemberConfig,
    client_template: ClientConfig,
    member_logging: Arc<dyn LoggerFactory>,
    client_logging: Arc<dyn LoggerFactory>,
    lifecycle_timeout: Duration,
}

impl NodeController {
    pub fn new(
        config: &HarnessConfig,
        client_logging: Arc<dyn LoggerFactory>,
    ) -> Self {
        Self {
            topology: config.topology.clone(),
            group: config.group.clone(),
            member_template: config.member.clone(),
            client_template: config.client.clone(),
            member_logging: Arc::new(StandardLoggerFactory::default()),
            client_logging,
            lifecycle_timeout: config.race.lifecycle_timeout(),
        }
    }

    /// Replaces the members' logging backend.
    pub fn with_member_logging(
        mut self,
        factory: Arc<dyn LoggerFactory>,
    ) -> Self {
        self.member_logging = factory;
        self
    }

    pub fn topology(&self) -> &ClusterTopology {
        &self.topology
    }

    /// Member settings for `port`: exactly that port, static-list discovery
    /// against the whole topology, no multicast, no interface restriction.
    pub fn member_config(
        &self,
        port: u16,
    ) -> MemberConfig {
        MemberConfig {
            instance_name: Some(format!("member.{port}")),
            group: self.group.clone(),
            port,
            port_auto_increment: false,
            multicast_enabled: false,
            tcp_ip_enabled: true,
            members: self.topology.addresses.clone(),
            interfaces_enabled: false,
            socket_bind_any: false,
            ..self.member_template.clone()
        }
    }

    /// Client settings against `addresses`: unlimited attempts, the
    /// configured attempt period, redo on disconnect.
    pub fn client_config(
        &self,
        addresses: &[Address],
    ) -> ClientConfig {
        ClientConfig {
            group: self.group.clone(),
            addresses: addresses.to_vec(),
            redo_operation: true,
            connection_attempt_limit: 0,
            ..self.client_template.clone()
        }
    }

    /// # Errors
    /// [`Error::Bind`] if the port is taken. Never retried.
    pub async fn start_member(
        &self,
        port: u16,
    ) -> Result<NodeHandle> {
        let config = self.member_config(port);
        let name = config.instance_name();
        let builder = MemberBuilder::new(config).logger_factory(self.member_logging.clone());

        let member = self.bounded(&name, "start", builder.start()).await?;
        info!(member = %member.address(), "member started");
        Ok(NodeHandle::Member(member))
    }

    /// Starts one member per topology address, in order. Members already
    /// started are shut down if a later one fails.
    pub async fn start_cluster(&self) -> Result<Vec<NodeHandle>> {
        let mut members = Vec::new();
        for port in self.topology.ports() {
            match self.start_member(port).await {
                Ok(m) => members.push(m),
                Err(e) => {
                    self.shutdown_all(members).await;
                    return Err(e);
                }
            }
        }
        Ok(members)
    }

    pub async fn start_client(
        &self,
        addresses: &[Address],
    ) -> Result<NodeHandle> {
        let config = self.client_config(addresses);
        let builder = ClientBuilder::new(config).logger_factory(self.client_logging.clone());

        let client = self.bounded("client", "start", builder.start()).await?;
        info!(client = %client.name(), owner = ?client.owner_address(), "client started");
        Ok(NodeHandle::Client(client))
    }

    /// Releases everything the node owns. Safe while a client is inside its
    /// reconnect loop.
    ///
    /// # Errors
    /// [`Error::LifecycleTimeout`] when the node does not stop in time.
    pub async fn shutdown(
        &self,
        handle: NodeHandle,
    ) -> Result<()> {
        let name = handle.name();
        debug!(node = %name, "shutting down");
        self.bounded(&name, "shutdown", handle.shutdown()).await?;
        info!(node = %name, "node shut down");
        Ok(())
    }

    /// Shuts down every handle, logging failures instead of returning them.
    pub async fn shutdown_all(
        &self,
        handles: Vec<NodeHandle>,
    ) {
        for handle in handles {
            let name = handle.name();
            if let Err(e) = self.shutdown(handle).await {
                warn!(node = %name, error = %e, "teardown failed");
            }
        }
    }

    async fn bounded<T>(
        &self,
        node: &str,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        timeout(self.lifecycle_timeout, call)
            .await
            .map_err(|_| Error::LifecycleTimeout {
                node: node.to_string(),
                operation,
                timeout: self.lifecycle_timeout,
            })?
    }
}
