//! Long algebraic move grammar used by `bestmove` and `ponder`.
//!
//! A move is a source square, a destination square and an optional
//! promotion piece: `e2e4`, `g1f3`, `f7f8q`. The promotion letter is only
//! accepted when the move goes from the 2nd or 7th rank to the 1st or 8th.
//! Matching is case-insensitive.

const PROMOTION_PIECES: [u8; 4] = [b'q', b'r', b'b', b'n'];

fn is_file(byte: u8) -> bool {
    matches!(byte.to_ascii_lowercase(), b'a'..=b'h')
}

fn is_rank(byte: u8) -> bool {
    matches!(byte, b'1'..=b'8')
}

/// Returns true if `token` is a well-formed long algebraic move.
#[must_use]
pub fn is_valid_move(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes {
        &[from_file, from_rank, to_file, to_rank] => {
            is_file(from_file) && is_rank(from_rank) && is_file(to_file) && is_rank(to_rank)
        }
        &[from_file, from_rank, to_file, to_rank, piece] => {
            is_file(from_file)
                && matches!(from_rank, b'2' | b'7')
                && is_file(to_file)
                && matches!(to_rank, b'1' | b'8')
                && PROMOTION_PIECES.contains(&piece.to_ascii_lowercase())
        }
        _ => false,
    }
}

/// Parse a move token, returning it unchanged when it matches the grammar.
#[must_use]
pub fn parse_move(token: &str) -> Option<&str> {
    is_valid_move(token).then_some(token)
}
