//! Logging seam between node internals and the harness.
//!
//! - [`Logger`] / [`LoggerFactory`] - the capability every node service logs through
//! - [`StandardLoggerFactory`] - forwards to `tracing`
//! - [`CapturingLoggerFactory`] - wraps another backend and records severe events
//! - [`install`] / [`resolve`] - process-wide fallback for components built without injection

mod capturing;
mod logger;
mod record;
mod registry;
mod standard;

pub use capturing::*;
pub use logger::*;
pub use record::*;
pub use registry::*;
pub use standard::*;

#[cfg(test)]
mod capturing_test;
