//! Process-wide logging backend switch.
//!
//! Nodes normally receive their [`LoggerFactory`] by injection. Anything built
//! without one resolves the process-wide backend here, and the first
//! resolution freezes the choice: installing a backend afterwards would leave
//! already-created loggers bypassing it, so it is rejected.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::LoggerFactory;
use super::StandardLoggerFactory;
use crate::Error;
use crate::Result;

struct Backend {
    factory: Arc<dyn LoggerFactory>,
    installed: bool,
}

/// The cell is filled exactly once, either by `install` or by the first
/// `resolve`, so the two cannot interleave.
pub struct LoggingRegistry {
    backend: OnceCell<Backend>,
}

impl LoggingRegistry {
    pub const fn new() -> Self {
        Self {
            backend: OnceCell::new(),
        }
    }

    pub fn install(
        &self,
        factory: Arc<dyn LoggerFactory>,
    ) -> Result<()> {
        self.backend
            .set(Backend {
                factory,
                installed: true,
            })
            .map_err(|_| {
                if self.is_installed() {
                    Error::LoggingAlreadyInstalled
                } else {
                    Error::LoggingRegisteredTooLate
                }
            })
    }

    /// Installed backend, or the standard one. Freezes the registry.
    pub fn resolve(&self) -> Arc<dyn LoggerFactory> {
        self.backend
            .get_or_init(|| Backend {
                factory: Arc::new(StandardLoggerFactory::default()),
                installed: false,
            })
            .factory
            .clone()
    }

    pub fn is_installed(&self) -> bool {
        self.backend.get().is_some_and(|b| b.installed)
    }
}

impl Default for LoggingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: LoggingRegistry = LoggingRegistry::new();

/// Installs `factory` as the process-wide backend. Must run before any
/// component resolves a logger.
pub fn install(factory: Arc<dyn LoggerFactory>) -> Result<()> {
    REGISTRY.install(factory)
}

pub fn resolve() -> Arc<dyn LoggerFactory> {
    REGISTRY.resolve()
}
