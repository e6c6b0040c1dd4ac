use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep_until;
use tokio::time::Instant;

use super::ClientContext;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Error;
use crate::Logger;
use crate::Result;

/// Sends requests over the owner connection.
///
/// With `redo_operation` enabled, an invocation that finds the client
/// disconnected waits for the reconnect loop and is re-sent on the new owner,
/// until the invocation timeout or shutdown ends it.
pub(crate) struct InvocationService {
    ctx: Arc<ClientContext>,
    logger: Arc<dyn Logger>,
}

impl InvocationService {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        let logger = ctx.logger("invocation");
        Self { ctx, logger }
    }

    /// # Errors
    /// - [`Error::ClientNotActive`] if the client shuts down before a reply
    /// - [`Error::Disconnected`] when disconnected and redo is disabled
    /// - [`Error::Timeout`] once the invocation timeout elapses
    pub(crate) async fn invoke(
        &self,
        request: Request,
    ) -> Result<Response> {
        let invocation_timeout = self.ctx.config.invocation_timeout();
        let deadline = Instant::now() + invocation_timeout;
        let redo = self.ctx.config.redo_operation;

        loop {
            if !self.ctx.lifecycle.is_running() {
                return Err(Error::ClientNotActive);
            }

            let Some(connection) = self.ctx.current_connection() else {
                if !redo {
                    return Err(Error::Disconnected);
                }
                self.wait_for_connection(deadline, invocation_timeout).await?;
                continue;
            };

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout(invocation_timeout));
            }

            let result = tokio::select! {
                _ = self.ctx.shutdown.cancelled() => return Err(Error::ClientNotActive),
                result = connection.call(&request, remaining) => result,
            };

            match result {
                Ok(response) => return Ok(response),
                Err(_) if !self.ctx.lifecycle.is_running() => return Err(Error::ClientNotActive),
                Err(e) if e.is_retryable() => {
                    self.ctx.connection_lost(&connection);
                    if !redo {
                        return Err(e);
                    }
                    self.logger.fine(&format!(
                        "{} to {} failed, redoing on next owner: {e}",
                        request.kind(),
                        connection.member()
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn wait_for_connection(
        &self,
        deadline: Instant,
        invocation_timeout: Duration,
    ) -> Result<()> {
        let mut owner = self.ctx.connection.subscribe();
        loop {
            let connected = owner.borrow_and_update().is_some();
            if connected {
                return Ok(());
            }
            tokio::select! {
                _ = self.ctx.shutdown.cancelled() => return Err(Error::ClientNotActive),
                _ = sleep_until(deadline) => return Err(Error::Timeout(invocation_timeout)),
                changed = owner.changed() => {
                    if changed.is_err() {
                        return Err(Error::ClientNotActive);
                    }
                }
            }
        }
    }
}
