//! Helpers shared by the unit tests: logger setup, port ranges, member and
//! client configs, and a backend that records what it receives.
mod common;
mod recording_logger;

pub use common::*;
pub use recording_logger::*;
