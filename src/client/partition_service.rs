use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;

use super::ClientContext;
use crate::protocol::partition_id;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Error;
use crate::Logger;
use crate::Result;

/// Keeps a copy of the partition table, refreshed on a timer and whenever the
/// owner connection changes.
pub(crate) struct PartitionService {
    ctx: Arc<ClientContext>,
    logger: Arc<dyn Logger>,
    table: ArcSwap<Vec<SocketAddr>>,
}

impl PartitionService {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        let logger = ctx.logger("partition");
        Self {
            ctx,
            logger,
            table: ArcSwap::from_pointee(vec![]),
        }
    }

    pub(crate) async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.ctx.config.partition_refresh_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut owner_changes = self.ctx.connection.subscribe();

        loop {
            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => return,
                _ = ticker.tick() => {}
                changed = owner_changes.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }

            if let Err(e) = self.refresh().await {
                self.report_refresh_failure(&e);
            }
        }
    }

    /// Fetches the table from the current owner.
    pub(crate) async fn refresh(&self) -> Result<()> {
        let Some(connection) = self.ctx.current_connection() else {
            return Ok(());
        };

        match connection
            .call(&Request::PartitionTable, self.ctx.config.invocation_timeout())
            .await
        {
            Ok(Response::Partitions(owners)) => {
                self.logger.finest(&format!("Partition table refreshed from {}", connection.member()));
                self.table.store(Arc::new(owners));
                Ok(())
            }
            Ok(other) => Err(Error::Protocol(format!("unexpected partition table reply: {other:?}"))),
            Err(e) => {
                self.ctx.connection_lost(&connection);
                Err(e)
            }
        }
    }

    /// A refresh that fails because the client is going away is expected and
    /// must stay below severe.
    fn report_refresh_failure(
        &self,
        e: &Error,
    ) {
        if !self.ctx.lifecycle.is_running() {
            self.logger.fine(&format!("Partition refresh skipped during shutdown: {e}"));
        } else if e.is_retryable() {
            self.logger.warning_with("Error while fetching cluster partition table", e);
        } else {
            self.logger.warning(&format!("Partition table refresh failed: {e}"));
        }
    }

    /// Owner of the partition `key` hashes to, if the table is known.
    pub(crate) fn partition_owner(
        &self,
        key: &str,
    ) -> Option<SocketAddr> {
        let table = self.table.load();
        table.get(partition_id(key) as usize).copied()
    }

    pub(crate) fn partition_count(&self) -> usize {
        self.table.load().len()
    }
}
