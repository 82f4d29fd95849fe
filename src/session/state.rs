//! Session state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle of an engine session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Starting,
    Running,
    ShuttingDown,
    Closed,
}

impl SessionState {
    /// Returns true if the session still accepts `send`.
    #[must_use]
    pub fn accepts_commands(self) -> bool {
        matches!(self, Self::Starting | Self::Running)
    }
}

/// State machine for tracking session progress.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
    commands_sent: usize,
    tokens_decoded: usize,
    decode_errors: usize,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Starting,
            commands_sent: 0,
            tokens_decoded: 0,
            decode_errors: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition(&mut self, new_state: SessionState) {
        tracing::debug!(from = ?self.state, to = ?new_state, "State transition");
        self.state = new_state;
    }

    pub fn record_command(&mut self) {
        self.commands_sent = self.commands_sent.saturating_add(1);
    }

    pub fn record_tokens(&mut self, count: usize) {
        self.tokens_decoded = self.tokens_decoded.saturating_add(count);
    }

    pub fn record_decode_error(&mut self) {
        self.decode_errors = self.decode_errors.saturating_add(1);
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            commands_sent: self.commands_sent,
            tokens_decoded: self.tokens_decoded,
            decode_errors: self.decode_errors,
        }
    }
}

/// Session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub commands_sent: usize,
    pub tokens_decoded: usize,
    pub decode_errors: usize,
}
