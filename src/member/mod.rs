mod member;
mod state;

pub use member::*;
pub(crate) use state::*;
