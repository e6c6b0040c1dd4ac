//! Race orchestration: bring a cluster up, attach a reconnecting client,
//! pull the cluster away and shut the client down inside its reconnect loop.

mod driver;
mod outcome;
mod phase;

pub use driver::*;
pub use outcome::*;
pub use phase::*;
