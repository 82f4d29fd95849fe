//! Tests for command encoding.

use std::num::NonZeroU64;

use uci_bridge::protocol::Command;

#[test]
fn encode_keyword_commands() {
    assert_eq!(Command::Uci.encode(), "uci");
    assert_eq!(Command::IsReady.encode(), "isready");
    assert_eq!(Command::UciNewGame.encode(), "ucinewgame");
    assert_eq!(Command::PonderHit.encode(), "ponderhit");
    assert_eq!(Command::Stop.encode(), "stop");
    assert_eq!(Command::Quit.encode(), "quit");
}

#[test]
fn encode_position_startpos_with_moves() {
    let command = Command::position_startpos(["e2e4", "e7e5"]);
    assert_eq!(command.encode(), "position startpos moves e2e4 e7e5");
}

#[test]
fn encode_position_fen() {
    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    let command = Command::position_fen(fen, ["e7e5"]);
    assert_eq!(command.encode(), format!("position fen {fen} moves e7e5"));

    let bare = Command::position_fen(fen, Vec::<String>::new());
    assert_eq!(bare.encode(), format!("position fen {fen}"));
}

#[test]
fn encode_go() {
    let five_seconds = NonZeroU64::new(5000).unwrap();
    assert_eq!(Command::go_movetime(five_seconds).encode(), "go movetime 5000");
    assert_eq!(Command::go_infinite().encode(), "go infinite");
}

#[test]
fn encode_setoption() {
    assert_eq!(
        Command::set_option("Hash", Some("64")).encode(),
        "setoption name Hash value 64"
    );
    assert_eq!(
        Command::set_option("Clear Hash", None::<String>).encode(),
        "setoption name Clear Hash"
    );
}

#[test]
fn display_matches_encode() {
    let command = Command::position_startpos(["d2d4"]);
    assert_eq!(command.to_string(), command.encode());
}
