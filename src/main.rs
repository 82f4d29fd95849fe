//! uci-bridge - talk to UCI chess engines from the command line.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use uci_bridge::config::{ConfigLoader, SessionConfig};
use uci_bridge::display;
use uci_bridge::protocol::{Command, ResponseToken};
use uci_bridge::session::{EngineSession, SessionError};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    name = "uci-bridge",
    about = "Drive a UCI chess engine over its standard streams",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to .uci-bridge.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not truncate long lines.
    #[arg(long, global = true)]
    raw: bool,

    /// Print decoded tokens as JSON lines instead of a transcript.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the UCI handshake and list the engine's identity and options.
    Probe {
        /// Engine executable (overrides `engine_path` from the config).
        engine: Option<PathBuf>,
    },
    /// Search a position and print the engine's analysis and best move.
    Analyse {
        /// Engine executable (overrides `engine_path` from the config).
        engine: Option<PathBuf>,
        /// Root position as FEN; the initial position when omitted.
        #[arg(long)]
        fen: Option<String>,
        /// Moves played from the root position.
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
        /// Search time in milliseconds.
        #[arg(long, default_value = "1000")]
        movetime: NonZeroU64,
        /// Drop the engine's first output line.
        #[arg(long)]
        discard_banner: bool,
    },
}

/// How decoded tokens are written to stdout.
#[derive(Debug, Clone, Copy)]
struct Output {
    raw: bool,
    json: bool,
}

impl Output {
    fn sent(self, line: &str) {
        if !self.json {
            display::print_sent(line);
        }
    }

    fn tokens(self, tokens: &[ResponseToken]) {
        for token in tokens {
            if self.json {
                match serde_json::to_string(token) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize token"),
                }
            } else {
                display::print_received(token, self.raw);
            }
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> CliResult<SessionConfig> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    Ok(loader.load()?)
}

fn resolve_engine(arg: Option<PathBuf>, config: &SessionConfig) -> CliResult<PathBuf> {
    arg.or_else(|| config.engine_path.clone())
        .ok_or_else(|| "no engine given: pass a path or set engine_path in the config".into())
}

async fn send(session: &EngineSession, command: &Command, out: Output) -> Result<(), SessionError> {
    let line = session.send(command).await?;
    out.sent(&line);
    Ok(())
}

/// Send `command` and print everything until `done` matches or `timeout` elapses.
async fn exchange<F>(
    session: &EngineSession,
    command: &Command,
    done: F,
    timeout: Duration,
    out: Output,
) -> Result<Vec<ResponseToken>, SessionError>
where
    F: Fn(&ResponseToken) -> bool,
{
    send(session, command, out).await?;
    let tokens = session.collect_until(done, timeout).await?;
    out.tokens(&tokens);
    Ok(tokens)
}

/// `uci` / `uciok`, configured options, then `isready` / `readyok`.
async fn handshake(session: &EngineSession, out: Output) -> Result<(), SessionError> {
    let timeout = session.config().receive_timeout();
    let tokens = exchange(session, &Command::Uci, |t| *t == ResponseToken::UciOk, timeout, out).await?;
    if !tokens.contains(&ResponseToken::UciOk) {
        tracing::warn!("Engine did not answer uciok in time");
    }

    let options: Vec<Command> = session
        .config()
        .options
        .iter()
        .map(|(name, value)| Command::set_option(name.clone(), Some(value.clone())))
        .collect();
    for option in &options {
        send(session, option, out).await?;
    }

    exchange(session, &Command::IsReady, |t| *t == ResponseToken::ReadyOk, timeout, out).await?;
    Ok(())
}

/// Search one position with a fixed move time.
async fn analyse(
    session: &EngineSession,
    position: &Command,
    movetime: NonZeroU64,
    out: Output,
) -> Result<(), SessionError> {
    handshake(session, out).await?;
    send(session, &Command::UciNewGame, out).await?;
    send(session, position, out).await?;

    // Leave room for the engine to report its final bestmove.
    let search_timeout = Duration::from_millis(movetime.get()) + session.config().receive_timeout();
    let tokens = exchange(
        session,
        &Command::go_movetime(movetime),
        ResponseToken::is_terminal,
        search_timeout,
        out,
    )
    .await?;

    if !tokens.iter().any(ResponseToken::is_terminal) {
        tracing::warn!("No bestmove before timeout, stopping search");
        exchange(
            session,
            &Command::Stop,
            ResponseToken::is_terminal,
            session.config().receive_timeout(),
            out,
        )
        .await?;
    }
    Ok(())
}

async fn start_session(engine: &Path, config: SessionConfig) -> CliResult<EngineSession> {
    let session = EngineSession::spawn(engine, config).await?;
    display::print_session_start(&engine.display().to_string());
    Ok(session)
}

async fn finish_session(session: EngineSession, result: Result<(), SessionError>) -> CliResult<()> {
    session.shutdown().await;
    let stats = session.stats();
    display::print_session_end(stats.commands_sent, stats.tokens_decoded);
    Ok(result?)
}

async fn run(cli: Cli) -> CliResult<()> {
    let out = Output {
        raw: cli.raw,
        json: cli.json,
    };
    let mut config = load_config(cli.config)?;

    match cli.command {
        Commands::Probe { engine } => {
            let engine = resolve_engine(engine, &config)?;
            let session = start_session(&engine, config).await?;
            let result = handshake(&session, out).await;
            finish_session(session, result).await
        }
        Commands::Analyse {
            engine,
            fen,
            moves,
            movetime,
            discard_banner,
        } => {
            let engine = resolve_engine(engine, &config)?;
            config.discard_banner |= discard_banner;
            tracing::info!(
                engine = %engine.display(),
                fen = ?fen,
                moves = ?moves,
                movetime = movetime.get(),
                "Starting analysis"
            );

            let position = match fen {
                Some(fen) => Command::position_fen(fen, moves),
                None => Command::position_startpos(moves),
            };
            let session = start_session(&engine, config).await?;
            let result = analyse(&session, &position, movetime, out).await;
            finish_session(session, result).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
