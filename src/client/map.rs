use std::sync::Arc;

use super::InvocationService;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Error;
use crate::Result;

/// Named key/value map stored on the cluster.
///
/// Exists to give the client real invocations to keep in flight while its
/// owner disappears.
#[derive(Clone)]
pub struct MapProxy {
    name: String,
    invocations: Arc<InvocationService>,
}

impl MapProxy {
    pub(crate) fn new(
        name: String,
        invocations: Arc<InvocationService>,
    ) -> Self {
        Self { name, invocations }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the previous value.
    pub async fn put(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> Result<Option<Vec<u8>>> {
        self.value(Request::Put {
            map: self.name.clone(),
            key: key.to_string(),
            value,
        })
        .await
    }

    pub async fn get(
        &self,
        key: &str,
    ) -> Result<Option<Vec<u8>>> {
        self.value(Request::Get {
            map: self.name.clone(),
            key: key.to_string(),
        })
        .await
    }

    pub async fn remove(
        &self,
        key: &str,
    ) -> Result<Option<Vec<u8>>> {
        self.value(Request::Remove {
            map: self.name.clone(),
            key: key.to_string(),
        })
        .await
    }

    async fn value(
        &self,
        request: Request,
    ) -> Result<Option<Vec<u8>>> {
        match self.invocations.invoke(request).await? {
            Response::Value(v) => Ok(v),
            other => Err(Error::Protocol(format!("unexpected map reply: {other:?}"))),
        }
    }
}
