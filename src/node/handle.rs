use std::fmt;

use crate::Client;
use crate::Member;
use crate::Result;

/// A running node started by the [`NodeController`](super::NodeController).
///
/// Owns the node's tasks and sockets. `shutdown` consumes the handle, so a
/// node can only be stopped once.
pub enum NodeHandle {
    Member(Member),
    Client(Client),
}

impl NodeHandle {
    pub fn name(&self) -> String {
        match self {
            NodeHandle::Member(m) => m.instance_name(),
            NodeHandle::Client(c) => c.name().to_string(),
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            NodeHandle::Member(m) => Some(m),
            NodeHandle::Client(_) => None,
        }
    }

    pub fn as_client(&self) -> Option<&Client> {
        match self {
            NodeHandle::Client(c) => Some(c),
            NodeHandle::Member(_) => None,
        }
    }

    pub(crate) async fn shutdown(self) -> Result<()> {
        match self {
            NodeHandle::Member(m) => m.shutdown().await,
            NodeHandle::Client(c) => c.shutdown().await,
        }
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            NodeHandle::Member(m) => write!(f, "Member({})", m.address()),
            NodeHandle::Client(c) => write!(f, "Client({})", c.name()),
        }
    }
}
