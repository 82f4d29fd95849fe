//! UCI wire protocol: command encoding and response decoding.
//!
//! Both directions are pure functions over text lines. Nothing in this
//! module performs I/O; see [`crate::session`] for the stdio plumbing.

mod command;
mod error;
mod moves;
mod response;

pub use command::*;
pub use error::*;
pub use moves::*;
pub use response::*;
