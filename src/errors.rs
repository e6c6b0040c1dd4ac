//! Error hierarchy for the reconnect race harness.
//!
//! Errors are split by who owns the failure: configuration and wire-level
//! problems, node lifecycle failures, and failures of the harness's own
//! preconditions (which abort an attempt instead of producing a verdict).

use std::net::SocketAddr;
use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

use crate::logging::CapturedCause;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Semantic configuration violations found by `validate()`
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Host/port that could not be resolved to a socket address
    #[error("Failed to resolve address {0}")]
    AddressResolution(String),

    /// Member could not bind its port. Fatal for the attempt, never retried.
    #[error("Failed to bind member to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    /// Peer answered with something the request does not allow
    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Authentication rejected by {address}: {reason}")]
    AuthenticationFailed { address: SocketAddr, reason: String },

    /// Connection closed underneath an invocation
    #[error("Connection to {0} lost")]
    ConnectionLost(SocketAddr),

    /// No owner connection and redo-on-disconnect is disabled
    #[error("Client is not connected to the cluster")]
    Disconnected,

    /// Client is shutting down or already shut down
    #[error("Client is not active")]
    ClientNotActive,

    #[error("Unable to connect to any cluster member after {attempts} attempt(s)")]
    ClusterUnreachable { attempts: u32 },

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A start or shutdown call did not return within its bound
    #[error("Lifecycle call `{operation}` on {node} did not finish within {timeout:?}")]
    LifecycleTimeout {
        node: String,
        operation: &'static str,
        timeout: Duration,
    },

    /// A whole race attempt exceeded its outer timeout
    #[error("Race attempt did not settle within {0:?}")]
    AttemptTimeout(Duration),

    /// Capturing backend was installed after a logger had already been resolved
    #[error("Logging backend installed after the first logger was resolved")]
    LoggingRegisteredTooLate,

    #[error("Logging backend already installed")]
    LoggingAlreadyInstalled,

    /// The assertion this harness exists for
    #[error("Severe failure logged during the race: {}", display_cause(cause))]
    SevereLogged { cause: Option<CapturedCause> },

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

fn display_cause(cause: &Option<CapturedCause>) -> String {
    match cause {
        Some(c) => c.to_string(),
        None => "<no cause recorded>".to_string(),
    }
}

impl Error {
    /// Failures that void the attempt instead of producing a pass/fail verdict.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            Error::Bind { .. }
                | Error::LoggingRegisteredTooLate
                | Error::LifecycleTimeout { .. }
                | Error::AttemptTimeout(_)
        )
    }

    /// Connection-level failures the client is expected to ride out while
    /// members are unreachable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::ConnectionLost(_) | Error::Timeout(_) | Error::Disconnected
        )
    }
}
