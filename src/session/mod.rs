//! Engine session: process spawning, background reading and buffering.

mod engine;
mod error;
mod process;
mod queue;
mod reader;
mod state;

pub use engine::*;
pub use error::*;
pub use process::*;
pub use queue::*;
pub use reader::*;
pub use state::*;
