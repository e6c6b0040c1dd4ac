use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::DropGuard;

use super::ClientContext;
use super::ClusterService;
use super::InvocationService;
use super::LifecycleState;
use super::MapProxy;
use super::PartitionService;
use crate::logging;
use crate::ClientConfig;
use crate::Error;
use crate::LoggerFactory;
use crate::Result;

pub struct ClientBuilder {
    config: ClientConfig,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            logger_factory: None,
        }
    }

    /// Logging backend for every service of this client. Without one, the
    /// process-wide backend is resolved at `start()`.
    pub fn logger_factory(
        mut self,
        factory: Arc<dyn LoggerFactory>,
    ) -> Self {
        self.logger_factory = Some(factory);
        self
    }

    /// Connects to the cluster and starts the background services.
    ///
    /// Blocks until an owner connection is authenticated. With an unlimited
    /// attempt limit and no reachable member this never returns; callers
    /// bound it with a timeout.
    pub async fn start(self) -> Result<Client> {
        self.config.validate()?;

        let factory = self.logger_factory.unwrap_or_else(logging::resolve);
        let ctx = Arc::new(ClientContext::new(self.config, factory));
        ctx.lifecycle.fire_starting();

        let cluster = ClusterService::new(ctx.clone());
        if let Err(e) = cluster.connect_to_cluster().await {
            ctx.lifecycle.begin_shutdown();
            ctx.stop();
            ctx.lifecycle.finish_shutdown();
            return Err(e);
        }
        ctx.lifecycle.mark_started();

        let partitions = Arc::new(PartitionService::new(ctx.clone()));
        let invocations = Arc::new(InvocationService::new(ctx.clone()));
        let tasks = vec![
            tokio::spawn(cluster.run()),
            tokio::spawn(ClusterService::heartbeat(ctx.clone())),
            tokio::spawn(partitions.clone().run()),
        ];

        Ok(Client {
            _guard: ctx.shutdown.clone().drop_guard(),
            ctx,
            tasks,
            partitions,
            invocations,
        })
    }
}

/// A running client. Dropping it cancels the background services;
/// [`Client::shutdown`] also waits for them.
pub struct Client {
    ctx: Arc<ClientContext>,
    tasks: Vec<JoinHandle<()>>,
    partitions: Arc<PartitionService>,
    invocations: Arc<InvocationService>,
    _guard: DropGuard,
}

impl Client {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn id(&self) -> &str {
        &self.ctx.id
    }

    pub fn name(&self) -> &str {
        &self.ctx.name
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.ctx.lifecycle.state()
    }

    pub fn is_running(&self) -> bool {
        self.ctx.lifecycle.is_running()
    }

    pub fn is_connected(&self) -> bool {
        self.ctx.current_connection().is_some_and(|c| c.is_alive())
    }

    /// Member the owner connection points at.
    pub fn owner_address(&self) -> Option<SocketAddr> {
        self.ctx.current_connection().map(|c| c.member())
    }

    /// Members reported by the most recent owner.
    pub fn members(&self) -> Vec<SocketAddr> {
        self.ctx.members.load().to_vec()
    }

    pub fn map(
        &self,
        name: &str,
    ) -> MapProxy {
        MapProxy::new(name.to_string(), self.invocations.clone())
    }

    pub fn partition_owner(
        &self,
        key: &str,
    ) -> Option<SocketAddr> {
        self.partitions.partition_owner(key)
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.partition_count()
    }

    /// Pulls the partition table from the owner now instead of waiting for
    /// the next refresh tick.
    pub async fn refresh_partitions(&self) -> Result<()> {
        self.partitions.refresh().await
    }

    /// Stops every service and closes the owner connection.
    ///
    /// Safe while the client is inside its reconnect loop: every wait there
    /// observes the shutdown token. Also succeeds on a client that already
    /// shut itself down.
    ///
    /// # Errors
    /// [`Error::LifecycleTimeout`] if the services do not stop within
    /// `shutdown_timeout_ms`; they are aborted in that case.
    pub async fn shutdown(self) -> Result<()> {
        let Client { ctx, tasks, .. } = self;

        ctx.lifecycle.begin_shutdown();
        ctx.stop();

        let aborts: Vec<_> = tasks.iter().map(|t| t.abort_handle()).collect();
        let shutdown_timeout = ctx.config.shutdown_timeout();
        match timeout(shutdown_timeout, join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    result?;
                }
            }
            Err(_) => {
                aborts.iter().for_each(|a| a.abort());
                return Err(Error::LifecycleTimeout {
                    node: ctx.name.clone(),
                    operation: "shutdown",
                    timeout: shutdown_timeout,
                });
            }
        }

        ctx.lifecycle.finish_shutdown();
        Ok(())
    }

    /// Adds a task that `shutdown` must join.
    #[cfg(test)]
    pub(crate) fn track_task(
        &mut self,
        task: JoinHandle<()>,
    ) {
        self.tasks.push(task);
    }
}
