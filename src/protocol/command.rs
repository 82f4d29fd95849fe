//! Commands sent from the client to the engine.

use std::fmt;
use std::num::NonZeroU64;

/// A command the client can send to a UCI engine.
///
/// Every variant is well-formed by construction, so [`Command::encode`]
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the engine to UCI mode.
    Uci,
    /// Synchronisation ping, answered with `readyok`.
    IsReady,
    /// The next search will be from a different game.
    UciNewGame,
    /// The opponent played the expected ponder move.
    PonderHit,
    /// Stop the current search as soon as possible.
    Stop,
    /// Terminate the engine.
    Quit,
    /// Start searching, either for a fixed time or until `stop`.
    Go {
        /// Search time in milliseconds; `None` searches infinitely.
        movetime_ms: Option<NonZeroU64>,
    },
    /// Set up a position, from a FEN string or the initial position.
    Position {
        /// FEN of the root position; `None` means `startpos`.
        fen: Option<String>,
        /// Moves played from the root position, in order.
        moves: Vec<String>,
    },
    /// Change an engine option.
    SetOption {
        /// Option name as advertised by the engine.
        name: String,
        /// New value; `None` for buttons.
        value: Option<String>,
    },
}

impl Command {
    /// `go infinite`.
    #[must_use]
    pub fn go_infinite() -> Self {
        Self::Go { movetime_ms: None }
    }

    /// `go movetime <ms>`. A zero search time is unrepresentable.
    #[must_use]
    pub fn go_movetime(ms: NonZeroU64) -> Self {
        Self::Go {
            movetime_ms: Some(ms),
        }
    }

    /// `position startpos [moves ...]`.
    #[must_use]
    pub fn position_startpos<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Position {
            fen: None,
            moves: moves.into_iter().map(Into::into).collect(),
        }
    }

    /// `position fen <fen> [moves ...]`.
    #[must_use]
    pub fn position_fen<I, S>(fen: impl Into<String>, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Position {
            fen: Some(fen.into()),
            moves: moves.into_iter().map(Into::into).collect(),
        }
    }

    /// `setoption name <name> [value <value>]`.
    #[must_use]
    pub fn set_option(name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        Self::SetOption {
            name: name.into(),
            value: value.map(Into::into),
        }
    }

    /// The leading keyword of the wire line.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Uci => "uci",
            Self::IsReady => "isready",
            Self::UciNewGame => "ucinewgame",
            Self::PonderHit => "ponderhit",
            Self::Stop => "stop",
            Self::Quit => "quit",
            Self::Go { .. } => "go",
            Self::Position { .. } => "position",
            Self::SetOption { .. } => "setoption",
        }
    }

    /// Render the command as a single wire line, without the line terminator.
    #[must_use]
    pub fn encode(&self) -> String {
        let keyword = self.keyword();
        match self {
            Self::Uci | Self::IsReady | Self::UciNewGame | Self::PonderHit | Self::Stop | Self::Quit => {
                keyword.to_string()
            }
            Self::Go { movetime_ms } => match movetime_ms {
                Some(ms) => format!("{keyword} movetime {ms}"),
                None => format!("{keyword} infinite"),
            },
            Self::Position { fen, moves } => {
                let mut line = match fen.as_deref().map(str::trim) {
                    Some(fen) if !fen.is_empty() => format!("{keyword} fen {fen}"),
                    _ => format!("{keyword} startpos"),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            Self::SetOption { name, value } => {
                let mut line = format!("{keyword} name {name}");
                if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                    line.push_str(" value ");
                    line.push_str(value);
                }
                line
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
