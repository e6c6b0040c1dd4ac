use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::LifecycleService;
use super::OwnerConnection;
use crate::ClientConfig;
use crate::Logger;
use crate::LoggerFactory;

/// State shared between the client handle and its background services.
pub(crate) struct ClientContext {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) config: ClientConfig,
    pub(crate) logging: Arc<dyn LoggerFactory>,
    pub(crate) lifecycle: LifecycleService,
    /// Current owner connection; `None` while disconnected
    pub(crate) connection: watch::Sender<Option<Arc<OwnerConnection>>>,
    /// Members reported by the last owner
    pub(crate) members: ArcSwap<Vec<SocketAddr>>,
    pub(crate) reconnect: Notify,
    pub(crate) shutdown: CancellationToken,
}

impl ClientContext {
    pub(crate) fn new(
        config: ClientConfig,
        logging: Arc<dyn LoggerFactory>,
    ) -> Self {
        let id = nanoid::nanoid!(10);
        let name = format!("client_{id}");
        let lifecycle = LifecycleService::new(name.clone(), logging.logger(&format!("{name}.lifecycle")));
        let (connection, _) = watch::channel(None);
        Self {
            id,
            name,
            config,
            logging,
            lifecycle,
            connection,
            members: ArcSwap::from_pointee(vec![]),
            reconnect: Notify::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub(crate) fn logger(
        &self,
        service: &str,
    ) -> Arc<dyn Logger> {
        self.logging.logger(&format!("{}.{service}", self.name))
    }

    pub(crate) fn current_connection(&self) -> Option<Arc<OwnerConnection>> {
        self.connection.borrow().clone()
    }

    pub(crate) fn install_connection(
        &self,
        connection: Arc<OwnerConnection>,
        members: Vec<SocketAddr>,
    ) {
        self.members.store(Arc::new(members));
        if let Some(previous) = self.connection.send_replace(Some(connection)) {
            previous.close();
        }
    }

    /// Drops `lost` if it is still the current owner connection and asks the
    /// cluster service to reconnect.
    pub(crate) fn connection_lost(
        &self,
        lost: &Arc<OwnerConnection>,
    ) {
        lost.close();
        let removed = self.connection.send_if_modified(|current| match current {
            Some(c) if Arc::ptr_eq(c, lost) => {
                *current = None;
                true
            }
            _ => false,
        });
        if removed && self.lifecycle.is_running() {
            self.reconnect.notify_one();
        }
    }

    /// Stops every background service. Safe to call more than once.
    pub(crate) fn stop(&self) {
        self.shutdown.cancel();
        if let Some(connection) = self.connection.send_replace(None) {
            connection.close();
        }
    }
}
