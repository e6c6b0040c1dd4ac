mod controller;
mod handle;

pub use controller::*;
pub use handle::*;

#[cfg(test)]
mod node_test;
