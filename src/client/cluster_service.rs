//! Owner connection management: initial connect, heartbeat and the
//! reconnect loop.

use std::net::SocketAddr;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::time::interval;
use tokio::time::sleep;
use tokio::time::MissedTickBehavior;

use super::ClientContext;
use super::ConnectionEvent;
use super::OwnerConnection;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Error;
use crate::Logger;
use crate::Result;

pub(crate) struct ClusterService {
    ctx: Arc<ClientContext>,
    logger: Arc<dyn Logger>,
}

impl ClusterService {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        let logger = ctx.logger("cluster");
        Self { ctx, logger }
    }

    /// Tries every known address once per round, pausing
    /// `connection_attempt_period` between rounds, until one accepts or the
    /// attempt limit is reached.
    ///
    /// # Errors
    /// - [`Error::ClientNotActive`] once shutdown has begun
    /// - [`Error::ClusterUnreachable`] when a finite attempt limit is exhausted
    pub(crate) async fn connect_to_cluster(&self) -> Result<()> {
        let config = &self.ctx.config;
        let period = config.connection_attempt_period();
        let mut attempt: u32 = 0;

        loop {
            if !self.ctx.lifecycle.is_running() {
                return Err(Error::ClientNotActive);
            }
            attempt = attempt.saturating_add(1);

            for address in self.candidate_addresses().await {
                let opened = tokio::select! {
                    _ = self.ctx.shutdown.cancelled() => return Err(Error::ClientNotActive),
                    opened = OwnerConnection::open(
                        address,
                        &config.group,
                        &self.ctx.id,
                        config.connection_timeout(),
                    ) => opened,
                };

                match opened {
                    Ok((connection, members)) => {
                        // Lost the race with shutdown: do not resurrect the client.
                        if !self.ctx.lifecycle.is_running() {
                            connection.close();
                            return Err(Error::ClientNotActive);
                        }
                        let owner = connection.member();
                        self.ctx.install_connection(Arc::new(connection), members);
                        self.logger.info(&format!("Authenticated with owner member {owner}"));
                        self.ctx.lifecycle.fire_connection_event(ConnectionEvent::Connected);
                        return Ok(());
                    }
                    Err(e) => self.logger.fine(&format!("Unable to connect to {address}: {e}")),
                }
            }

            if config.is_attempt_limited() && attempt >= config.connection_attempt_limit {
                return Err(Error::ClusterUnreachable { attempts: attempt });
            }

            let limit = if config.is_attempt_limited() {
                config.connection_attempt_limit.to_string()
            } else {
                "unlimited".to_string()
            };
            self.logger.warning(&format!(
                "Unable to get alive cluster connection, try in {} ms later, attempt {attempt} of {limit}.",
                period.as_millis()
            ));

            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => return Err(Error::ClientNotActive),
                _ = sleep(period) => {}
            }
        }
    }

    /// Configured addresses first, then members learned from the last owner.
    async fn candidate_addresses(&self) -> Vec<SocketAddr> {
        let mut candidates = Vec::new();
        for address in &self.ctx.config.addresses {
            match address.resolve().await {
                Ok(a) if !candidates.contains(&a) => candidates.push(a),
                Ok(_) => {}
                Err(e) => self.logger.fine(&format!("Skipping unresolvable address {address}: {e}")),
            }
        }
        for member in self.ctx.members.load().iter() {
            if !candidates.contains(member) {
                candidates.push(*member);
            }
        }
        if self.ctx.config.shuffle_member_list {
            candidates.shuffle(&mut rand::thread_rng());
        }
        candidates
    }

    /// Waits for connection loss and reconnects until shutdown.
    pub(crate) async fn run(self) {
        loop {
            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => return,
                _ = self.ctx.reconnect.notified() => {}
            }

            if self.ctx.current_connection().is_some_and(|c| c.is_alive()) {
                continue;
            }
            if !self.ctx.lifecycle.is_running() {
                return;
            }
            self.ctx.lifecycle.fire_connection_event(ConnectionEvent::Disconnected);

            match self.connect_to_cluster().await {
                Ok(()) => {}
                Err(Error::ClientNotActive) => {
                    self.logger.fine("Reconnect abandoned, client is shutting down");
                    return;
                }
                Err(e) => {
                    self.logger
                        .severe_with("Unable to connect to any cluster member, shutting down the client", &e);
                    if self.ctx.lifecycle.begin_shutdown() {
                        self.ctx.stop();
                        self.ctx.lifecycle.finish_shutdown();
                    }
                    return;
                }
            }
        }
    }

    /// Pings the owner every heartbeat interval; a failed ping drops the
    /// connection and wakes the reconnect loop.
    pub(crate) async fn heartbeat(ctx: Arc<ClientContext>) {
        let logger = ctx.logger("heartbeat");
        let period = ctx.config.heartbeat_interval();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ctx.shutdown.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let Some(connection) = ctx.current_connection() else {
                continue;
            };

            match connection.call(&Request::Ping, period).await {
                Ok(Response::Pong) => {}
                Ok(other) => logger.warning(&format!("Unexpected heartbeat reply: {other:?}")),
                Err(e) if !ctx.lifecycle.is_running() => {
                    logger.fine(&format!("Heartbeat interrupted by shutdown: {e}"));
                }
                Err(e) => {
                    logger.warning_with(
                        &format!("Heartbeat to owner {} failed, closing connection", connection.member()),
                        &e,
                    );
                    ctx.connection_lost(&connection);
                }
            }
        }
    }
}
