//! Length-delimited bincode frames over TCP.

use std::net::SocketAddr;

use bytes::Bytes;
use futures::SinkExt;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tokio_util::codec::LengthDelimitedCodec;

use crate::Error;
use crate::Result;

const MAX_FRAME_LENGTH: usize = 4 * 1024 * 1024;

pub struct FramedConnection {
    peer: SocketAddr,
    inner: Framed<TcpStream, LengthDelimitedCodec>,
}

impl FramedConnection {
    pub fn new(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        let codec = LengthDelimitedCodec::builder()
            .max_frame_length(MAX_FRAME_LENGTH)
            .new_codec();
        Ok(Self {
            peer,
            inner: Framed::new(stream, codec),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub async fn send<T: Serialize>(
        &mut self,
        message: &T,
    ) -> Result<()> {
        let bytes = bincode::serialize(message)?;
        self.inner.send(Bytes::from(bytes)).await?;
        Ok(())
    }

    /// Next frame, or `None` when the peer closed the connection cleanly.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        match self.inner.next().await {
            Some(frame) => Ok(Some(bincode::deserialize(&frame?)?)),
            None => Ok(None),
        }
    }

    /// Sends `request` and waits for exactly one reply. A closed connection
    /// is reported as [`Error::ConnectionLost`].
    pub async fn call<Req, Resp>(
        &mut self,
        request: &Req,
    ) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        self.send(request).await?;
        self.recv().await?.ok_or(Error::ConnectionLost(self.peer))
    }
}
