//! uci-bridge - async client for UCI chess engines.
//!
//! [`protocol`] turns commands into wire lines and wire lines into tokens.
//! [`session`] runs an engine process and buffers its output.

pub mod config;
pub mod display;
pub mod protocol;
pub mod session;
