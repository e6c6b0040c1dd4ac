//! A cluster member: binds one port, joins its peers through a static
//! address list and serves authenticated client sessions.
//!
//! ## Example Usage
//! ```rust,ignore
//! let member = MemberBuilder::new(config).start().await?;
//! // ...
//! member.shutdown().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::sync::DropGuard;

use super::MemberState;
use crate::logging;
use crate::protocol::FramedConnection;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Address;
use crate::Error;
use crate::LoggerFactory;
use crate::MemberConfig;
use crate::Result;

pub struct MemberBuilder {
    config: MemberConfig,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
}

impl MemberBuilder {
    pub fn new(config: MemberConfig) -> Self {
        Self {
            config,
            logger_factory: None,
        }
    }

    /// Logging backend for this member. Without one, the process-wide
    /// backend is resolved at `start()`.
    pub fn logger_factory(
        mut self,
        factory: Arc<dyn LoggerFactory>,
    ) -> Self {
        self.logger_factory = Some(factory);
        self
    }

    /// Binds, joins the static member list and starts serving.
    ///
    /// # Errors
    /// [`Error::Bind`] when no candidate port can be bound. This is never
    /// retried beyond the configured auto-increment range.
    pub async fn start(self) -> Result<Member> {
        self.config.validate()?;

        let factory = self.logger_factory.unwrap_or_else(logging::resolve);
        let instance = self.config.instance_name();
        let logger = factory.logger(&format!("{instance}.member"));

        let (listener, address) = bind(&self.config).await?;
        let state = Arc::new(MemberState::new(address, self.config, logger));
        state.logger.info(&format!("[{address}] is STARTING"));

        let shutdown = CancellationToken::new();
        let accept_task = tokio::spawn(accept_loop(listener, state.clone(), shutdown.clone()));

        join(&state).await;
        state.logger.info(&format!("[{address}] is STARTED"));

        Ok(Member {
            state,
            accept_task,
            guard: shutdown.drop_guard(),
        })
    }
}

pub struct Member {
    state: Arc<MemberState>,
    accept_task: JoinHandle<()>,
    guard: DropGuard,
}

impl Member {
    pub fn address(&self) -> SocketAddr {
        self.state.address
    }

    pub fn members(&self) -> Vec<SocketAddr> {
        self.state.members()
    }

    pub fn instance_name(&self) -> String {
        self.state.config.instance_name()
    }

    /// Leaves the cluster, closes every connection and releases the port.
    pub async fn shutdown(self) -> Result<()> {
        let state = self.state;
        let address = state.address;
        state.logger.info(&format!("[{address}] is SHUTTING_DOWN"));

        leave(&state).await;

        let shutdown = self.guard.disarm();
        shutdown.cancel();
        self.accept_task.await?;

        state.logger.info(&format!("[{address}] is SHUTDOWN"));
        Ok(())
    }
}

async fn bind(config: &MemberConfig) -> Result<(TcpListener, SocketAddr)> {
    let mut last_error = None;
    for port in config.candidate_ports() {
        let advertised = Address::new(config.host.as_str(), port).resolve().await?;
        let bind_addr = if config.socket_bind_any {
            SocketAddr::new([0, 0, 0, 0].into(), port)
        } else {
            advertised
        };

        match TcpListener::bind(bind_addr).await {
            Ok(listener) => return Ok((listener, advertised)),
            Err(e) => last_error = Some((bind_addr, e)),
        }
    }

    match last_error {
        Some((address, source)) => Err(Error::Bind {
            address: address.to_string(),
            source,
        }),
        None => Err(Error::InvalidConfig("no candidate port to bind".into())),
    }
}

async fn resolve_peers(state: &MemberState) -> Vec<SocketAddr> {
    let mut peers = Vec::new();
    for address in &state.config.members {
        match address.resolve().await {
            Ok(a) if a == state.address => {}
            Ok(a) => peers.push(a),
            Err(e) => state.logger.warning_with(&format!("Cannot resolve member address {address}"), &e),
        }
    }
    peers
}

/// Announces this member to every reachable peer of the static list.
/// Peers that are not up yet will announce themselves when they start.
async fn join(state: &MemberState) {
    for peer in resolve_peers(state).await {
        let request = Request::Join {
            address: state.address,
            group_name: state.config.group.name.clone(),
            group_password: state.config.group.password.clone(),
        };
        match exchange(peer, &request, state).await {
            Ok(Response::Joined { members }) => state.add_members(&members),
            Ok(Response::Rejected { reason }) => {
                state.logger.warning(&format!("Join rejected by {peer}: {reason}"));
            }
            Ok(other) => state.logger.warning(&format!("Unexpected join reply from {peer}: {other:?}")),
            Err(e) => state.logger.fine(&format!("Could not connect to {peer} while joining: {e}")),
        }
    }
}

async fn leave(state: &MemberState) {
    for peer in state.members().into_iter().filter(|m| *m != state.address) {
        let request = Request::Leave {
            address: state.address,
            group_name: state.config.group.name.clone(),
            group_password: state.config.group.password.clone(),
        };
        if let Err(e) = exchange(peer, &request, state).await {
            state.logger.fine(&format!("Could not notify {peer} of shutdown: {e}"));
        }
    }
}

async fn exchange(
    peer: SocketAddr,
    request: &Request,
    state: &MemberState,
) -> Result<Response> {
    let join_timeout = state.config.join_timeout();
    timeout(join_timeout, async {
        let stream = TcpStream::connect(peer).await?;
        let mut conn = FramedConnection::new(stream)?;
        conn.call::<Request, Response>(request).await
    })
    .await
    .map_err(|_| Error::Timeout(join_timeout))?
}

async fn accept_loop(
    listener: TcpListener,
    state: Arc<MemberState>,
    shutdown: CancellationToken,
) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => {
                    connections.spawn(serve_connection(stream, state.clone(), shutdown.clone()));
                }
                Err(e) => state.logger.warning_with("Failed to accept connection", &e),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    // Close the port before tearing down sessions so peers see refusals.
    drop(listener);
    connections.shutdown().await;
}

async fn serve_connection(
    stream: TcpStream,
    state: Arc<MemberState>,
    shutdown: CancellationToken,
) {
    let mut conn = match FramedConnection::new(stream) {
        Ok(c) => c,
        Err(e) => {
            state.logger.fine(&format!("Dropping connection: {e}"));
            return;
        }
    };
    let peer = conn.peer();
    let mut authenticated = false;

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = conn.recv::<Request>() => next,
        };

        let request = match next {
            Ok(Some(r)) => r,
            Ok(None) => break,
            Err(e) => {
                state.logger.fine(&format!("Connection from {peer} closed: {e}"));
                break;
            }
        };

        if !authenticated {
            let credentials = match &request {
                Request::Authenticate {
                    group_name,
                    group_password,
                    ..
                }
                | Request::Join {
                    group_name,
                    group_password,
                    ..
                }
                | Request::Leave {
                    group_name,
                    group_password,
                    ..
                } => Some((group_name.as_str(), group_password.as_str())),
                _ => None,
            };
            let reason = match credentials {
                Some((name, password)) if state.credentials_match(name, password) => None,
                Some(_) => Some("group name or password mismatch"),
                None => Some("not authenticated"),
            };
            if let Some(reason) = reason {
                state.logger.warning(&format!("Rejected {} from {peer}: {reason}", request.kind()));
                let _ = conn
                    .send(&Response::Rejected {
                        reason: reason.to_string(),
                    })
                    .await;
                break;
            }
            authenticated = true;
        }

        let response = state.handle(request);
        if let Err(e) = conn.send(&response).await {
            state.logger.fine(&format!("Failed to answer {peer}: {e}"));
            break;
        }
    }
}
