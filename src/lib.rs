//! Reproduces a shutdown-while-reconnecting race in a cluster client and
//! checks, through a capturing logging backend, that the client never logs a
//! severe failure when it is shut down inside its reconnect loop.
//!
//! ## Layout
//! - [`logging`] - logger seam and the severity-capturing backend
//! - [`member`] / [`client`] - the in-process cluster the race runs against
//! - [`node`] - starts and stops members and the client
//! - [`race`] - the race driver

pub mod client;
pub mod config;
pub mod logging;
pub mod member;
pub mod node;
pub mod protocol;
pub mod race;

mod errors;

pub use client::*;
pub use crate::config::*;
pub use errors::*;
pub use logging::*;
pub use member::*;
pub use node::*;
pub use race::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
