use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Started,
    ShuttingDown,
    Shutdown,
}

impl fmt::Display for LifecycleState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            LifecycleState::Starting => "STARTING",
            LifecycleState::Started => "STARTED",
            LifecycleState::ShuttingDown => "SHUTTING_DOWN",
            LifecycleState::Shutdown => "SHUTDOWN",
        };
        f.write_str(s)
    }
}

/// Connection-level events reported alongside lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
}

/// Tracks the client's lifecycle. Transitions only move forward.
pub(crate) struct LifecycleService {
    name: String,
    state: Mutex<LifecycleState>,
    logger: Arc<dyn Logger>,
}

impl LifecycleService {
    pub(crate) fn new(
        name: String,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name,
            state: Mutex::new(LifecycleState::Starting),
            logger,
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// True until shutdown begins.
    pub(crate) fn is_running(&self) -> bool {
        matches!(self.state(), LifecycleState::Starting | LifecycleState::Started)
    }

    pub(crate) fn fire_starting(&self) {
        self.logger.info(&format!("{} is {}", self.name, LifecycleState::Starting));
    }

    pub(crate) fn mark_started(&self) -> bool {
        self.transition(LifecycleState::Starting, LifecycleState::Started)
    }

    /// Returns `false` when shutdown was already under way.
    pub(crate) fn begin_shutdown(&self) -> bool {
        let previous = {
            let mut state = self.state.lock();
            let previous = *state;
            if matches!(previous, LifecycleState::Starting | LifecycleState::Started) {
                *state = LifecycleState::ShuttingDown;
            }
            previous
        };
        let began = matches!(previous, LifecycleState::Starting | LifecycleState::Started);
        if began {
            self.logger.info(&format!("{} is {}", self.name, LifecycleState::ShuttingDown));
        }
        began
    }

    pub(crate) fn finish_shutdown(&self) -> bool {
        self.transition(LifecycleState::ShuttingDown, LifecycleState::Shutdown)
    }

    pub(crate) fn fire_connection_event(
        &self,
        event: ConnectionEvent,
    ) {
        let label = match event {
            ConnectionEvent::Connected => "CLIENT_CONNECTED",
            ConnectionEvent::Disconnected => "CLIENT_DISCONNECTED",
        };
        self.logger.info(&format!("{} is {}", self.name, label));
    }

    fn transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
    ) -> bool {
        let moved = {
            let mut state = self.state.lock();
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        };
        if moved {
            self.logger.info(&format!("{} is {}", self.name, to));
        }
        moved
    }
}
