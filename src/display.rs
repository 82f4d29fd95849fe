//! Colored CLI display utilities for engine transcripts.
//!
//! This module provides functions for printing the commands sent to and the
//! tokens received from an engine, with timestamps and colors.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::protocol::{IdKind, Info, ResponseToken, Score, ScoreBound, UciOption};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Maximum length for truncated display strings.
const DEFAULT_MAX_LEN: usize = 120;

/// Truncate a string to a maximum length, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize, raw_mode: bool) -> String {
    if raw_mode || s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }
    let head: String = s.chars().take(max_len - 3).collect();
    format!("{head}...")
}

/// Format a score the way analysis GUIs show it.
#[must_use]
pub fn format_score(score: &Score) -> String {
    match score {
        Score::Centipawns { value, bound } => {
            let pawns = f64::from(*value) / 100.0;
            let marker = match bound {
                ScoreBound::Exact => "",
                ScoreBound::Lower => ">=",
                ScoreBound::Upper => "<=",
            };
            format!("{marker}{pawns:+.2}")
        }
        Score::Mate(moves) => format!("#{moves}"),
    }
}

/// One-line summary of an `info` token.
#[must_use]
pub fn format_info(info: &Info) -> String {
    let mut parts = Vec::new();
    if let Some(depth) = info.depth {
        match info.sel_depth {
            Some(sel) => parts.push(format!("depth={depth}/{sel}")),
            None => parts.push(format!("depth={depth}")),
        }
    }
    if let Some(score) = &info.score {
        parts.push(format!("score={}", format_score(score)));
    }
    if let Some(nodes) = info.nodes {
        parts.push(format!("nodes={nodes}"));
    }
    if let Some(nps) = info.nps {
        parts.push(format!("nps={nps}"));
    }
    if let Some(pv) = &info.principal_variation {
        parts.push(format!("pv={}", pv.join(" ")));
    }
    if let Some(text) = &info.string {
        parts.push(text.clone());
    }
    parts.join(" ")
}

/// Print session start information.
pub fn print_session_start(engine: &str) {
    println!(
        "{} {} engine={}",
        timestamp().dimmed(),
        "[SESSION]".blue().bold(),
        engine.cyan()
    );
    let _ = io::stdout().flush();
}

/// Print session end information.
pub fn print_session_end(commands_sent: usize, tokens_decoded: usize) {
    println!(
        "{} {} Session closed {}",
        timestamp().dimmed(),
        "[SESSION]".blue().bold(),
        format!("commands={commands_sent} tokens={tokens_decoded}").dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print a command line that was written to the engine.
pub fn print_sent(line: &str) {
    println!("{} {} {}", timestamp().dimmed(), "->".cyan().bold(), line);
    let _ = io::stdout().flush();
}

/// Print a decoded token.
pub fn print_received(token: &ResponseToken, raw_mode: bool) {
    let ts = timestamp();
    match token {
        ResponseToken::Id { kind, value } => {
            let label = match kind {
                IdKind::Name => "name",
                IdKind::Author => "author",
            };
            println!("{} {} {}={}", ts.dimmed(), "[ID]".magenta().bold(), label, value.bold());
        }
        ResponseToken::UciOk | ResponseToken::ReadyOk => {
            println!("{} {} {}", ts.dimmed(), "<-".green().bold(), token);
        }
        ResponseToken::BestMove(best) => {
            let ponder = best
                .ponder
                .as_deref()
                .map_or(String::new(), |p| format!(" ponder={p}"));
            println!(
                "{} {} {}{}",
                ts.dimmed(),
                "[BESTMOVE]".green().bold(),
                best.mv.bold(),
                ponder.dimmed()
            );
        }
        ResponseToken::Option(option) => print_option(option, raw_mode),
        ResponseToken::Info(info) => {
            println!(
                "{} {} {}",
                ts.dimmed(),
                "[INFO]".yellow(),
                truncate(&format_info(info), DEFAULT_MAX_LEN, raw_mode)
            );
        }
        ResponseToken::Unknown { raw } => {
            println!(
                "{} {} {}",
                ts.dimmed(),
                "<-".dimmed(),
                truncate(raw, DEFAULT_MAX_LEN, raw_mode).dimmed()
            );
        }
    }
    let _ = io::stdout().flush();
}

/// Print an advertised engine option.
pub fn print_option(option: &UciOption, raw_mode: bool) {
    let line = option.to_string();
    let detail = line
        .split_once(" type ")
        .map_or(line.as_str(), |(_, tail)| tail);
    println!(
        "{} {} {} ({})",
        timestamp().dimmed(),
        "[OPTION]".cyan(),
        option.name.bold(),
        truncate(detail, DEFAULT_MAX_LEN, raw_mode).dimmed()
    );
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10, false), "hello");
        assert_eq!(truncate("hello world", 8, false), "hello...");
        assert_eq!(truncate("hello world", 8, true), "hello world");
        assert_eq!(truncate("hello", 2, false), "...");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(
            format_score(&Score::Centipawns {
                value: -15,
                bound: ScoreBound::Exact
            }),
            "-0.15"
        );
        assert_eq!(
            format_score(&Score::Centipawns {
                value: 120,
                bound: ScoreBound::Lower
            }),
            ">=+1.20"
        );
        assert_eq!(format_score(&Score::Mate(-3)), "#-3");
    }

    #[test]
    fn test_format_info() {
        let info = Info {
            depth: Some(12),
            sel_depth: Some(18),
            score: Some(Score::Centipawns {
                value: 31,
                bound: ScoreBound::Exact,
            }),
            nodes: Some(1000),
            principal_variation: Some(vec!["e2e4".to_string(), "e7e5".to_string()]),
            ..Info::default()
        };
        assert_eq!(
            format_info(&info),
            "depth=12/18 score=+0.31 nodes=1000 pv=e2e4 e7e5"
        );
    }
}
