//! Session module tests.

#[cfg(unix)]
mod engine_test;
mod queue_test;

/// Verify all public session types are exported from the library.
#[test]
fn test_all_session_types_exported() {
    use uci_bridge::session::{
        EngineProcessBuilder, EngineSession, ResponseQueue, SessionError, SessionState,
        SessionStateMachine, SessionStats, SpawnError,
    };

    let _ = ResponseQueue::new();
    let _ = SessionStateMachine::new();
    let _ = EngineProcessBuilder::new("/usr/bin/stockfish");
    let _: fn() -> SessionError = || SessionError::StreamClosed;
    let _: fn() -> SpawnError = || SpawnError::NotFound("/missing".into());
    let _ = SessionState::Running;
    let _: Option<SessionStats> = None;
    let _: Option<&EngineSession> = None;
}
