//! Tokens decoded from engine output lines.
//!
//! [`decode`] maps one raw line to one [`ResponseToken`]. Lines that start
//! with a recognized keyword but carry a malformed payload are reported as
//! [`DecodeError`]; anything unrecognized becomes [`ResponseToken::Unknown`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::moves::parse_move;

/// Which engine identity field an `id` line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Name,
    Author,
}

impl IdKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Author => "author",
        }
    }
}

/// `bestmove <move> [ponder <move>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMove {
    /// The move the engine chose.
    pub mv: String,
    /// The reply the engine expects and would like to ponder on.
    pub ponder: Option<String>,
}

/// Discriminant of an engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Check,
    Spin,
    Combo,
    Button,
    String,
}

/// Type-specific payload of an engine option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    /// Boolean switch.
    Check { default: bool },
    /// Integer in `min..=max`.
    Spin { default: i64, min: i64, max: i64 },
    /// One of a fixed list of strings.
    Combo { default: String, values: Vec<String> },
    /// Action without a value.
    Button,
    /// Free text; `None` when the engine advertises no default.
    String { default: Option<String> },
}

impl OptionKind {
    /// The option's type keyword.
    #[must_use]
    pub fn option_type(&self) -> OptionType {
        match self {
            Self::Check { .. } => OptionType::Check,
            Self::Spin { .. } => OptionType::Spin,
            Self::Combo { .. } => OptionType::Combo,
            Self::Button => OptionType::Button,
            Self::String { .. } => OptionType::String,
        }
    }
}

/// `option name <name> type <type> ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciOption {
    pub name: String,
    pub kind: OptionKind,
}

/// Whether a centipawn score is exact or only a bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBound {
    #[default]
    Exact,
    Lower,
    Upper,
}

/// Evaluation reported in an `info` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    /// Centipawns from the engine's point of view.
    Centipawns { value: i32, bound: ScoreBound },
    /// Mate in this many moves; negative when the engine is getting mated.
    Mate(i32),
}

/// Search progress reported by an `info` line. Absent fields were not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub depth: Option<u32>,
    pub sel_depth: Option<u32>,
    pub multi_pv: Option<u32>,
    pub score: Option<Score>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hash_full: Option<u32>,
    pub tb_hits: Option<u64>,
    pub cpu_load: Option<u32>,
    pub time: Option<u64>,
    pub curr_move: Option<String>,
    pub curr_move_number: Option<u32>,
    pub principal_variation: Option<Vec<String>>,
    pub string: Option<String>,
}

impl Info {
    /// Centipawn score, if the line carried one.
    #[must_use]
    pub fn cp_score(&self) -> Option<i32> {
        match self.score {
            Some(Score::Centipawns { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Mate distance, if the line carried one.
    #[must_use]
    pub fn mate_score(&self) -> Option<i32> {
        match self.score {
            Some(Score::Mate(moves)) => Some(moves),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_lower_bound(&self) -> bool {
        matches!(
            self.score,
            Some(Score::Centipawns {
                bound: ScoreBound::Lower,
                ..
            })
        )
    }

    #[must_use]
    pub fn is_upper_bound(&self) -> bool {
        matches!(
            self.score,
            Some(Score::Centipawns {
                bound: ScoreBound::Upper,
                ..
            })
        )
    }
}

/// One decoded line of engine output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseToken {
    /// Engine name or author.
    Id { kind: IdKind, value: String },
    /// End of the `uci` handshake.
    UciOk,
    /// Answer to `isready`.
    ReadyOk,
    /// End of a search.
    BestMove(BestMove),
    /// An option the engine supports.
    Option(UciOption),
    /// Search progress.
    Info(Info),
    /// Anything else, kept as normalized text.
    Unknown { raw: String },
}

impl ResponseToken {
    /// Returns true if this token ends a search (`bestmove`).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BestMove(_))
    }

    /// Returns the best move if this is a `BestMove` token.
    #[must_use]
    pub fn best_move(&self) -> Option<&BestMove> {
        match self {
            Self::BestMove(best) => Some(best),
            _ => None,
        }
    }

    /// Returns the info payload if this is an `Info` token.
    #[must_use]
    pub fn info(&self) -> Option<&Info> {
        match self {
            Self::Info(info) => Some(info),
            _ => None,
        }
    }
}

/// Strip tabs and line terminators, collapse runs of spaces and trim.
#[must_use]
pub fn normalize(line: &str) -> String {
    let stripped: String = line
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive ASCII prefix strip.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Decode one line of engine output.
///
/// # Errors
///
/// Returns `DecodeError` if the line starts with `id`, `bestmove`, `option`
/// or `info` but does not follow that keyword's grammar.
pub fn decode(line: &str) -> Result<ResponseToken, DecodeError> {
    decode_normalized(&normalize(line))
}

fn decode_normalized(line: &str) -> Result<ResponseToken, DecodeError> {
    if strip_prefix_ci(line, "id ").is_some() {
        decode_id(line)
    } else if strip_prefix_ci(line, "uciok").is_some() {
        Ok(ResponseToken::UciOk)
    } else if strip_prefix_ci(line, "readyok").is_some() {
        Ok(ResponseToken::ReadyOk)
    } else if let Some(rest) = strip_prefix_ci(line, "bestmove ") {
        decode_best_move(line, rest).map(ResponseToken::BestMove)
    } else if let Some(rest) = strip_prefix_ci(line, "option name ") {
        decode_option(line, rest).map(ResponseToken::Option)
    } else if let Some(rest) = strip_prefix_ci(line, "info ") {
        decode_info(line, rest).map(ResponseToken::Info)
    } else {
        Ok(ResponseToken::Unknown {
            raw: line.to_string(),
        })
    }
}

fn decode_id(line: &str) -> Result<ResponseToken, DecodeError> {
    for kind in [IdKind::Name, IdKind::Author] {
        let prefix = format!("id {} ", kind.keyword());
        if let Some(value) = strip_prefix_ci(line, &prefix) {
            return Ok(ResponseToken::Id {
                kind,
                value: value.to_string(),
            });
        }
    }
    Err(DecodeError::MalformedId {
        line: line.to_string(),
    })
}

fn decode_best_move(line: &str, rest: &str) -> Result<BestMove, DecodeError> {
    let mut tokens = rest.split(' ');
    let mv = tokens
        .next()
        .and_then(parse_move)
        .ok_or_else(|| DecodeError::MalformedBestMove {
            line: line.to_string(),
        })?;

    let ponder = match (tokens.next(), tokens.next()) {
        (Some(keyword), Some(token)) if keyword.eq_ignore_ascii_case("ponder") => {
            parse_move(token).map(str::to_string)
        }
        _ => None,
    };

    Ok(BestMove {
        mv: mv.to_string(),
        ponder,
    })
}

fn decode_option(line: &str, rest: &str) -> Result<UciOption, DecodeError> {
    const TYPE_MARKER: &str = " type ";

    // ASCII lowercasing keeps byte offsets intact.
    let type_index = rest
        .to_ascii_lowercase()
        .find(TYPE_MARKER)
        .ok_or_else(|| DecodeError::MissingOptionType {
            line: line.to_string(),
        })?;

    let name = rest[..type_index].to_string();
    let tail: Vec<&str> = rest[type_index + TYPE_MARKER.len()..].split(' ').collect();
    let malformed = |reason: &str| DecodeError::MalformedOption {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let kind = match tail[0].to_ascii_lowercase().as_str() {
        "check" => match tail.as_slice() {
            [_, keyword, value] if keyword.eq_ignore_ascii_case("default") => {
                let default = if value.eq_ignore_ascii_case("true") {
                    true
                } else if value.eq_ignore_ascii_case("false") {
                    false
                } else {
                    return Err(malformed("check default must be true or false"));
                };
                OptionKind::Check { default }
            }
            _ => return Err(malformed("expected 'check default <bool>'")),
        },
        "spin" => decode_spin(line, &tail[1..])?,
        "combo" => decode_combo(&tail[1..])
            .ok_or_else(|| malformed("expected 'combo default <value> (var <value>)+'"))?,
        "button" => {
            if tail.len() != 1 {
                return Err(malformed("button takes no arguments"));
            }
            OptionKind::Button
        }
        "string" => match tail.as_slice() {
            [_, keyword, value @ ..] if keyword.eq_ignore_ascii_case("default") => {
                let value = value.join(" ");
                let default = (!value.is_empty() && value != "<empty>").then_some(value);
                OptionKind::String { default }
            }
            _ => return Err(malformed("expected 'string default [value]'")),
        },
        _ => return Err(malformed("unknown option type")),
    };

    Ok(UciOption { name, kind })
}

fn decode_spin(line: &str, args: &[&str]) -> Result<OptionKind, DecodeError> {
    let malformed = || DecodeError::MalformedOption {
        line: line.to_string(),
        reason: "expected 'spin default <n> min <n> max <n>'".to_string(),
    };

    if args.len() != 6 {
        return Err(malformed());
    }

    let (mut default, mut min, mut max) = (None, None, None);
    for pair in args.chunks_exact(2) {
        let key = pair[0].to_ascii_lowercase();
        let slot = match key.as_str() {
            "default" => &mut default,
            "min" => &mut min,
            "max" => &mut max,
            _ => return Err(malformed()),
        };
        *slot = Some(parse_number::<i64>(line, &key, pair[1])?);
    }

    match (default, min, max) {
        (Some(default), Some(min), Some(max)) => Ok(OptionKind::Spin { default, min, max }),
        _ => Err(malformed()),
    }
}

/// Parse `default <words> (var <words>)+`. Values may span several words.
fn decode_combo(args: &[&str]) -> Option<OptionKind> {
    let mut default: Option<Vec<&str>> = None;
    let mut values: Vec<Vec<&str>> = Vec::new();

    for &token in args {
        if token.eq_ignore_ascii_case("default") && default.is_none() && values.is_empty() {
            default = Some(Vec::new());
        } else if token.eq_ignore_ascii_case("var") {
            values.push(Vec::new());
        } else if let Some(current) = values.last_mut() {
            current.push(token);
        } else {
            default.as_mut()?.push(token);
        }
    }

    let default = default.filter(|words| !words.is_empty())?.join(" ");
    if values.is_empty() || values.iter().any(Vec::is_empty) {
        return None;
    }

    Some(OptionKind::Combo {
        default,
        values: values.into_iter().map(|words| words.join(" ")).collect(),
    })
}

fn parse_number<T: FromStr>(line: &str, key: &str, value: &str) -> Result<T, DecodeError> {
    value.parse().map_err(|_| DecodeError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
        line: line.to_string(),
    })
}

/// Left-to-right scanner over the tokens of an `info` line.
struct InfoScanner<'a> {
    line: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> InfoScanner<'a> {
    fn new(line: &'a str, rest: &'a str) -> Self {
        Self {
            line,
            tokens: rest.split(' ').filter(|t| !t.is_empty()).collect(),
            pos: 0,
        }
    }

    fn next_keyword(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.to_ascii_lowercase())
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn value(&mut self, key: &str) -> Result<&'a str, DecodeError> {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| DecodeError::MissingValue {
                key: key.to_string(),
                line: self.line.to_string(),
            })?;
        self.pos += 1;
        Ok(token)
    }

    fn number<T: FromStr>(&mut self, key: &str) -> Result<T, DecodeError> {
        let value = self.value(key)?;
        parse_number(self.line, key, value)
    }

    fn remaining(&mut self) -> Vec<&'a str> {
        let rest = self.tokens[self.pos..].to_vec();
        self.pos = self.tokens.len();
        rest
    }
}

fn decode_info(line: &str, rest: &str) -> Result<Info, DecodeError> {
    let mut scanner = InfoScanner::new(line, rest);
    let mut info = Info::default();

    while let Some(keyword) = scanner.next_keyword() {
        match keyword.as_str() {
            "depth" => info.depth = Some(scanner.number(&keyword)?),
            "seldepth" => info.sel_depth = Some(scanner.number(&keyword)?),
            "multipv" => info.multi_pv = Some(scanner.number(&keyword)?),
            "nodes" => info.nodes = Some(scanner.number(&keyword)?),
            "nps" => info.nps = Some(scanner.number(&keyword)?),
            "hashfull" => info.hash_full = Some(scanner.number(&keyword)?),
            "tbhits" => info.tb_hits = Some(scanner.number(&keyword)?),
            "cpuload" => info.cpu_load = Some(scanner.number(&keyword)?),
            "time" => info.time = Some(scanner.number(&keyword)?),
            "currmovenumber" => info.curr_move_number = Some(scanner.number(&keyword)?),
            "currmove" => info.curr_move = Some(scanner.value(&keyword)?.to_string()),
            "score" => {
                let unit = scanner.value(&keyword)?.to_ascii_lowercase();
                match unit.as_str() {
                    "cp" => {
                        let value = scanner.number("cp")?;
                        // The bound marker is left in place; the next pass skips it.
                        let bound = match scanner.peek().map(str::to_ascii_lowercase).as_deref() {
                            Some("lowerbound") => ScoreBound::Lower,
                            Some("upperbound") => ScoreBound::Upper,
                            _ => ScoreBound::Exact,
                        };
                        info.score = Some(Score::Centipawns { value, bound });
                    }
                    "mate" => info.score = Some(Score::Mate(scanner.number("mate")?)),
                    _ => {}
                }
            }
            "pv" => {
                let moves = scanner.remaining();
                info.principal_variation = Some(moves.into_iter().map(str::to_string).collect());
            }
            "string" => {
                info.string = Some(scanner.remaining().join(" "));
            }
            _ => {}
        }
    }

    Ok(info)
}

impl fmt::Display for UciOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option name {} type ", self.name)?;
        match &self.kind {
            OptionKind::Check { default } => write!(f, "check default {default}"),
            OptionKind::Spin { default, min, max } => {
                write!(f, "spin default {default} min {min} max {max}")
            }
            OptionKind::Combo { default, values } => {
                write!(f, "combo default {default}")?;
                for value in values {
                    write!(f, " var {value}")?;
                }
                Ok(())
            }
            OptionKind::Button => f.write_str("button"),
            OptionKind::String { default } => match default {
                Some(value) => write!(f, "string default {value}"),
                None => f.write_str("string default"),
            },
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("info")?;
        let numbers = [
            ("depth", self.depth.map(u64::from)),
            ("seldepth", self.sel_depth.map(u64::from)),
            ("multipv", self.multi_pv.map(u64::from)),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                write!(f, " {key} {value}")?;
            }
        }
        match self.score {
            Some(Score::Centipawns { value, bound }) => {
                write!(f, " score cp {value}")?;
                match bound {
                    ScoreBound::Exact => {}
                    ScoreBound::Lower => f.write_str(" lowerbound")?,
                    ScoreBound::Upper => f.write_str(" upperbound")?,
                }
            }
            Some(Score::Mate(moves)) => write!(f, " score mate {moves}")?,
            None => {}
        }
        let numbers = [
            ("nodes", self.nodes),
            ("nps", self.nps),
            ("hashfull", self.hash_full.map(u64::from)),
            ("tbhits", self.tb_hits),
            ("cpuload", self.cpu_load.map(u64::from)),
            ("time", self.time),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                write!(f, " {key} {value}")?;
            }
        }
        if let Some(mv) = &self.curr_move {
            write!(f, " currmove {mv}")?;
        }
        if let Some(number) = self.curr_move_number {
            write!(f, " currmovenumber {number}")?;
        }
        if let Some(pv) = &self.principal_variation {
            f.write_str(" pv")?;
            for mv in pv {
                write!(f, " {mv}")?;
            }
        }
        if let Some(text) = &self.string {
            write!(f, " string {text}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ResponseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id { kind, value } => write!(f, "id {} {value}", kind.keyword()),
            Self::UciOk => f.write_str("uciok"),
            Self::ReadyOk => f.write_str("readyok"),
            Self::BestMove(best) => {
                write!(f, "bestmove {}", best.mv)?;
                if let Some(ponder) = &best.ponder {
                    write!(f, " ponder {ponder}")?;
                }
                Ok(())
            }
            Self::Option(option) => option.fmt(f),
            Self::Info(info) => info.fmt(f),
            Self::Unknown { raw } => f.write_str(raw),
        }
    }
}
