//! Cluster client: one authenticated owner connection, a heartbeat, a
//! reconnect loop and a partition table refreshed in the background.
//!
//! # Basic Usage
//! ```ignore
//! let client = ClientBuilder::new(config)
//!     .logger_factory(factory)
//!     .start()
//!     .await?;
//!
//! client.map("m").put("k", b"v".to_vec()).await?;
//! client.shutdown().await?;
//! ```

mod client;
mod cluster_service;
mod connection;
mod context;
mod invocation;
mod lifecycle;
mod map;
mod partition_service;

pub use client::*;
pub(crate) use cluster_service::*;
pub(crate) use connection::*;
pub(crate) use context::*;
pub(crate) use invocation::*;
pub use lifecycle::*;
pub use map::*;
pub(crate) use partition_service::*;
