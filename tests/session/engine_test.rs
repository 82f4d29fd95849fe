//! Tests for sessions against a scripted engine process.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use uci_bridge::config::SessionConfig;
use uci_bridge::protocol::{Command, IdKind, OptionKind, ResponseToken};
use uci_bridge::session::{EngineSession, SessionError, SessionState, SpawnError};

const FAKE_ENGINE: &str = r#"
echo "Fake Engine 1.0 by Tester"
while read -r line; do
  case "$line" in
    uci)
      echo "id name Fake Engine 1.0"
      echo "id author Tester"
      echo "option name Hash type spin default 16 min 1 max 1024"
      echo "uciok"
      ;;
    isready)
      echo "readyok"
      ;;
    go*)
      echo "info depth 1 score cp 13 nodes 20 pv e2e4"
      echo "bestmove e2e4 ponder e7e5"
      ;;
    ucinewgame)
      echo "bestmove xx"
      echo "readyok"
      ;;
    quit)
      exit 0
      ;;
  esac
done
"#;

/// Write the fake engine script and return its path.
fn write_script(dir: &TempDir) -> PathBuf {
    let script = dir.path().join("fake-engine.sh");
    std::fs::write(&script, FAKE_ENGINE).unwrap();
    script
}

fn config_for(script: &Path, discard_banner: bool) -> SessionConfig {
    SessionConfig {
        engine_args: vec![script.display().to_string()],
        discard_banner,
        startup_timeout_ms: 2000,
        receive_timeout_ms: 2000,
        poll_interval_ms: 10,
        shutdown_grace_ms: 20,
        terminate_timeout_ms: 1000,
        ..SessionConfig::default()
    }
}

async fn start(dir: &TempDir, discard_banner: bool) -> EngineSession {
    let script = write_script(dir);
    // Run through the shell so the script itself never needs to be executable.
    assert_ok!(EngineSession::spawn("/bin/sh", config_for(&script, discard_banner)).await)
}

#[tokio::test]
async fn handshake_with_scripted_engine() {
    let dir = TempDir::new().unwrap();
    let session = start(&dir, true).await;

    assert_ok!(session.send(&Command::Uci).await);
    let tokens = assert_ok!(
        session
            .collect_until(|t| *t == ResponseToken::UciOk, Duration::from_secs(5))
            .await
    );

    assert_eq!(
        tokens[0],
        ResponseToken::Id {
            kind: IdKind::Name,
            value: "Fake Engine 1.0".to_string()
        }
    );
    let option = tokens
        .iter()
        .find_map(|t| match t {
            ResponseToken::Option(option) => Some(option),
            _ => None,
        })
        .unwrap();
    assert_eq!(option.name, "Hash");
    assert!(matches!(option.kind, OptionKind::Spin { default: 16, .. }));
    assert_eq!(tokens.last(), Some(&ResponseToken::UciOk));

    session.shutdown().await;
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn search_returns_bestmove() {
    let dir = TempDir::new().unwrap();
    let session = start(&dir, true).await;

    assert_ok!(session.send(&Command::position_startpos(["d2d4"])).await);
    assert_ok!(session.send(&Command::go_movetime(NonZeroU64::new(100).unwrap())).await);
    let tokens = assert_ok!(
        session
            .collect_until(ResponseToken::is_terminal, Duration::from_secs(5))
            .await
    );

    let info = tokens[0].info().unwrap();
    assert_eq!(info.cp_score(), Some(13));
    let best = tokens.last().and_then(ResponseToken::best_move).unwrap();
    assert_eq!(best.mv, "e2e4");
    assert_eq!(best.ponder.as_deref(), Some("e7e5"));

    session.shutdown().await;
    assert_eq!(session.stats().commands_sent, 2);
}

#[tokio::test]
async fn banner_kept_without_discard() {
    let dir = TempDir::new().unwrap();
    let session = start(&dir, false).await;

    let tokens = assert_ok!(session.receive().await);
    assert_eq!(
        tokens.first(),
        Some(&ResponseToken::Unknown {
            raw: "Fake Engine 1.0 by Tester".to_string()
        })
    );
    session.shutdown().await;
}

#[tokio::test]
async fn malformed_line_reports_decode_error() {
    let dir = TempDir::new().unwrap();
    let session = start(&dir, true).await;

    // The script answers ucinewgame with a malformed bestmove, then readyok.
    assert_ok!(session.send(&Command::UciNewGame).await);
    let err = assert_err!(session.receive().await);
    match err {
        SessionError::Decode { source, decoded } => {
            assert_eq!(source.line(), "bestmove xx");
            assert!(decoded.is_empty());
        }
        other => panic!("Expected Decode error, got {other:?}"),
    }

    let tokens = assert_ok!(
        session
            .collect_until(|t| *t == ResponseToken::ReadyOk, Duration::from_secs(5))
            .await
    );
    assert_eq!(tokens, vec![ResponseToken::ReadyOk]);
    assert_eq!(session.stats().decode_errors, 1);

    session.shutdown().await;
}

#[tokio::test]
async fn engine_exit_surfaces_on_receive_and_send() {
    let dir = TempDir::new().unwrap();
    let session = start(&dir, true).await;

    assert_ok!(session.send(&Command::Quit).await);
    let mut last = Ok(Vec::new());
    for _ in 0..20 {
        last = session.receive_timeout(Duration::from_millis(100)).await;
        if last.is_err() {
            break;
        }
    }
    let err = assert_err!(last);
    assert!(matches!(err, SessionError::StreamClosed));
    assert!(err.is_disconnect());

    // The engine's stdin is gone too, so the next write fails.
    let err = assert_err!(session.send(&Command::IsReady).await);
    assert!(matches!(err, SessionError::Io(_)), "got {err:?}");
    assert!(err.is_disconnect());

    session.shutdown().await;
}

#[tokio::test]
async fn spawn_missing_engine_fails() {
    let err = assert_err!(
        EngineSession::spawn("/nonexistent/engine", SessionConfig::default()).await
    );
    assert!(matches!(err, SessionError::Spawn(SpawnError::NotFound(_))));
}
