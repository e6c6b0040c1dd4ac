//! Wire protocol spoken between members, and between the client and its
//! owner member.
mod framed;
mod message;

pub use framed::*;
pub use message::*;

#[cfg(test)]
mod protocol_test;
