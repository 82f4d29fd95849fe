//! Session error types.

use crate::protocol::{DecodeError, ResponseToken};

use super::process::SpawnError;

/// Errors surfaced by [`EngineSession`](super::EngineSession) operations.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// The engine could not be started.
    #[error("Failed to start engine: {0}")]
    Spawn(#[from] SpawnError),

    /// The engine's stdin was not piped.
    #[error("Engine stdin not available")]
    NoStdin,

    /// The engine's stdout was not piped.
    #[error("Engine stdout not available")]
    NoStdout,

    /// Writing to the engine failed.
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine's output stream has ended and nothing is left to drain.
    #[error("Engine output stream closed")]
    StreamClosed,

    /// The session has been shut down.
    #[error("Session is closed")]
    Closed,

    /// A line in the drained batch was malformed.
    ///
    /// `decoded` holds the tokens that preceded it; later lines remain queued.
    #[error("Failed to decode engine output: {source}")]
    Decode {
        source: DecodeError,
        decoded: Vec<ResponseToken>,
    },
}

impl SessionError {
    /// Returns true if the error means the engine is gone.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::StreamClosed | Self::Closed => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}
