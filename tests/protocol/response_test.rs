//! Tests for response decoding.

use uci_bridge::protocol::{
    decode, BestMove, DecodeError, IdKind, OptionKind, ResponseToken, Score, ScoreBound,
};

fn squares() -> Vec<String> {
    let mut all = Vec::with_capacity(64);
    for file in 'a'..='h' {
        for rank in '1'..='8' {
            all.push(format!("{file}{rank}"));
        }
    }
    all
}

#[test]
fn decode_bestmove_every_square_pair() {
    let squares = squares();
    for from in &squares {
        for to in &squares {
            let mv = format!("{from}{to}");
            let token = decode(&format!("bestmove {mv}")).unwrap();
            assert_eq!(
                token,
                ResponseToken::BestMove(BestMove {
                    mv: mv.clone(),
                    ponder: None
                }),
                "move {mv}"
            );
        }
    }
}

#[test]
fn decode_bestmove_with_ponder() {
    let moves = ["e2e4", "g1f3", "a7a8q", "h2h1n", "e8g8"];
    for m1 in moves {
        for m2 in moves {
            let token = decode(&format!("bestmove {m1} ponder {m2}")).unwrap();
            let best = token.best_move().unwrap();
            assert_eq!(best.mv, m1);
            assert_eq!(best.ponder.as_deref(), Some(m2));
        }
    }
}

#[test]
fn decode_bestmove_malformed() {
    let err = decode("bestmove xx").unwrap_err();
    assert!(matches!(err, DecodeError::MalformedBestMove { .. }));
    assert_eq!(err.line(), "bestmove xx");
}

#[test]
fn decode_bestmove_rejects_promotion_off_the_last_rank() {
    let err = decode("bestmove e2e4q").unwrap_err();
    assert!(matches!(err, DecodeError::MalformedBestMove { .. }));
}

#[test]
fn decode_info_rejects_negative_depth() {
    let err = decode("info depth -1 nodes 10").unwrap_err();
    match err {
        DecodeError::InvalidNumber { key, value, .. } => {
            assert_eq!(key, "depth");
            assert_eq!(value, "-1");
        }
        other => panic!("Expected InvalidNumber, got {other:?}"),
    }
}

#[test]
fn decode_id_tolerates_whitespace() {
    let expected = ResponseToken::Id {
        kind: IdKind::Author,
        value: "David".to_string(),
    };
    assert_eq!(decode("id author David").unwrap(), expected);
    assert_eq!(decode("  id    author   David  ").unwrap(), expected);
    assert_eq!(decode("\tid  author \tDavid\r\n").unwrap(), expected);
}

#[test]
fn decode_id_name_keeps_interior_words() {
    assert_eq!(
        decode("id name Stockfish 12").unwrap(),
        ResponseToken::Id {
            kind: IdKind::Name,
            value: "Stockfish 12".to_string()
        }
    );
}

#[test]
fn decode_handshake_tokens() {
    assert_eq!(decode("uciok").unwrap(), ResponseToken::UciOk);
    assert_eq!(decode("readyok").unwrap(), ResponseToken::ReadyOk);
}

#[test]
fn decode_spin_option() {
    let token = decode("option name Hash type spin default 16 min 1 max 33554432").unwrap();
    match token {
        ResponseToken::Option(option) => {
            assert_eq!(option.name, "Hash");
            assert_eq!(
                option.kind,
                OptionKind::Spin {
                    default: 16,
                    min: 1,
                    max: 33_554_432
                }
            );
        }
        other => panic!("Expected Option token, got {other:?}"),
    }
}

#[test]
fn decode_info_search_line() {
    let token = decode(
        "info depth 20 seldepth 28 multipv 1 score cp 31 lowerbound nodes 2400000 nps 1200000 hashfull 512 tbhits 0 time 2000 pv e2e4 e7e5 g1f3",
    )
    .unwrap();
    let info = token.info().unwrap();

    assert_eq!(info.depth, Some(20));
    assert_eq!(info.sel_depth, Some(28));
    assert_eq!(info.multi_pv, Some(1));
    assert_eq!(
        info.score,
        Some(Score::Centipawns {
            value: 31,
            bound: ScoreBound::Lower
        })
    );
    assert!(info.is_lower_bound());
    assert_eq!(info.nodes, Some(2_400_000));
    assert_eq!(info.hash_full, Some(512));
    assert_eq!(info.time, Some(2000));
    assert_eq!(
        info.principal_variation,
        Some(vec!["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()])
    );
}

#[test]
fn decode_info_mate_score() {
    let token = decode("info depth 5 score mate -3 pv f7f6").unwrap();
    let info = token.info().unwrap();
    assert_eq!(info.mate_score(), Some(-3));
    assert_eq!(info.cp_score(), None);
}

#[test]
fn decode_unknown_line() {
    let token = decode("Stockfish 16 by the Stockfish developers").unwrap();
    assert_eq!(
        token,
        ResponseToken::Unknown {
            raw: "Stockfish 16 by the Stockfish developers".to_string()
        }
    );
}

#[test]
fn token_serializes_with_type_tag() {
    let json = serde_json::to_value(decode("readyok").unwrap()).unwrap();
    assert_eq!(json["type"], "ready_ok");
}
