//! Protocol module tests.

mod command_test;
mod response_test;

/// Verify all public protocol types are exported from the library.
#[test]
fn test_all_protocol_types_exported() {
    use uci_bridge::protocol::{
        decode, is_valid_move, normalize, parse_move, BestMove, Command, DecodeError, IdKind,
        Info, OptionKind, OptionType, ResponseToken, Score, ScoreBound, UciOption,
    };

    let _ = Command::go_infinite();
    let _ = BestMove {
        mv: "e2e4".to_string(),
        ponder: None,
    };
    let _ = UciOption {
        name: "Ponder".to_string(),
        kind: OptionKind::Check { default: false },
    };
    let _ = Info::default();
    let _ = Score::Mate(1);
    let _ = ScoreBound::Exact;
    let _ = IdKind::Name;
    let _ = OptionType::Button;
    let _: fn(&str) -> Result<ResponseToken, DecodeError> = decode;
    let _: fn(&str) -> String = normalize;
    let _: fn(&str) -> bool = is_valid_move;
    let _: fn(&str) -> Option<&str> = parse_move;
}
