use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::protocol::FramedConnection;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Error;
use crate::GroupConfig;
use crate::Result;

/// The client's single authenticated connection to a member.
///
/// Requests are serialised over one stream; a failed or timed out call marks
/// the connection dead and every later call fails fast.
pub(crate) struct OwnerConnection {
    member: SocketAddr,
    io: Mutex<FramedConnection>,
    alive: AtomicBool,
}

impl OwnerConnection {
    /// Connects and authenticates. Returns the connection and the member
    /// list the owner reported.
    pub(crate) async fn open(
        address: SocketAddr,
        group: &GroupConfig,
        client_id: &str,
        connect_timeout: Duration,
    ) -> Result<(Self, Vec<SocketAddr>)> {
        let handshake = async {
            let stream = TcpStream::connect(address).await?;
            let mut io = FramedConnection::new(stream)?;
            let reply: Response = io
                .call(&Request::Authenticate {
                    group_name: group.name.clone(),
                    group_password: group.password.clone(),
                    client_id: client_id.to_string(),
                })
                .await?;
            Ok::<_, Error>((io, reply))
        };

        let (io, reply) = timeout(connect_timeout, handshake)
            .await
            .map_err(|_| Error::Timeout(connect_timeout))??;

        match reply {
            Response::Authenticated { member, members } => Ok((
                Self {
                    member,
                    io: Mutex::new(io),
                    alive: AtomicBool::new(true),
                },
                members,
            )),
            Response::Rejected { reason } => Err(Error::AuthenticationFailed { address, reason }),
            other => Err(Error::Protocol(format!("unexpected authentication reply: {other:?}"))),
        }
    }

    pub(crate) fn member(&self) -> SocketAddr {
        self.member
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub(crate) async fn call(
        &self,
        request: &Request,
        call_timeout: Duration,
    ) -> Result<Response> {
        if !self.is_alive() {
            return Err(Error::ConnectionLost(self.member));
        }

        let result = timeout(call_timeout, async {
            let mut io = self.io.lock().await;
            io.call::<Request, Response>(request).await
        })
        .await
        .map_err(|_| Error::Timeout(call_timeout))
        .and_then(|r| r);

        match result {
            Ok(Response::Rejected { reason }) => Err(Error::Protocol(format!(
                "{} rejected by {}: {reason}",
                request.kind(),
                self.member
            ))),
            Ok(response) => Ok(response),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }
}
