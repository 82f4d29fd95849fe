//! Long-lived session with a UCI engine.
//!
//! An [`EngineSession`] owns the engine's stdio. Commands are encoded and
//! written straight to stdin; a background task buffers every stdout line in
//! a [`ResponseQueue`], and [`EngineSession::receive`] drains and decodes
//! that buffer on demand.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SessionConfig;
use crate::protocol::{decode, Command, ResponseToken};

use super::error::SessionError;
use super::process::{EngineProcess, EngineProcessBuilder};
use super::queue::ResponseQueue;
use super::reader::run_reader;
use super::state::{SessionState, SessionStateMachine, SessionStats};

type EngineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A running conversation with a UCI engine.
///
/// All methods take `&self`; share the session across tasks with an `Arc`.
/// Writes are serialized so concurrent `send` calls never interleave.
pub struct EngineSession {
    config: SessionConfig,
    process: AsyncMutex<Option<EngineProcess>>,
    writer: AsyncMutex<Option<EngineWriter>>,
    queue: Arc<ResponseQueue>,
    reader: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    state: Mutex<SessionStateMachine>,
}

impl std::fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSession")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl EngineSession {
    /// Launch the engine at `path` and start the background reader.
    ///
    /// Arguments and working directory come from `config`. When
    /// `config.discard_banner` is set, the first output line is dropped if it
    /// arrives within `config.startup_timeout_ms`. A banner still incomplete
    /// at that point is kept whole and queued like any other line.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Spawn` if the executable is missing or cannot
    /// be started.
    pub async fn spawn(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self, SessionError> {
        let mut builder = EngineProcessBuilder::new(path.as_ref()).args(config.engine_args.clone());
        if let Some(dir) = &config.working_dir {
            builder = builder.working_dir(dir);
        }

        let mut process = EngineProcess::spawn(&builder)?;
        let stdin = process.take_stdin().ok_or(SessionError::NoStdin)?;
        let stdout = process.take_stdout().ok_or(SessionError::NoStdout)?;

        tracing::info!(
            path = %builder.path().display(),
            pid = ?process.id(),
            "Engine session starting"
        );

        Ok(Self::launch(Some(process), Box::new(stdin), BufReader::new(stdout), config).await)
    }

    /// Run a session over arbitrary byte streams instead of a child process.
    ///
    /// Banner handling and shutdown behave as for [`EngineSession::spawn`],
    /// except that there is no process to terminate.
    pub async fn with_streams<W, R>(writer: W, reader: R, config: SessionConfig) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::launch(None, Box::new(writer), BufReader::new(reader), config).await
    }

    async fn launch<R>(
        process: Option<EngineProcess>,
        writer: EngineWriter,
        mut reader: BufReader<R>,
        config: SessionConfig,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mut machine = SessionStateMachine::new();

        // Bytes of a banner that was still incomplete at the startup timeout.
        let mut partial = Vec::new();
        if config.discard_banner {
            let mut banner = Vec::new();
            match tokio::time::timeout(config.startup_timeout(), reader.read_until(b'\n', &mut banner)).await {
                Ok(Ok(_)) => {
                    tracing::debug!(banner = %String::from_utf8_lossy(&banner).trim_end(), "Discarded engine banner");
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "Failed to read engine banner"),
                Err(_) if banner.is_empty() => tracing::debug!("No engine banner before startup timeout"),
                Err(_) => {
                    tracing::debug!(
                        partial = %String::from_utf8_lossy(&banner),
                        "Engine banner incomplete at startup timeout, keeping it"
                    );
                    partial = banner;
                }
            }
        }

        let stdout = BufReader::new(Cursor::new(partial).chain(reader));
        let queue = Arc::new(ResponseQueue::new());
        let cancel = CancellationToken::new();
        let reader = tokio::spawn(run_reader(stdout, Arc::clone(&queue), cancel.clone()));
        machine.transition(SessionState::Running);

        Self {
            config,
            process: AsyncMutex::new(process),
            writer: AsyncMutex::new(Some(writer)),
            queue,
            reader: Mutex::new(Some(reader)),
            cancel,
            state: Mutex::new(machine),
        }
    }

    fn machine(&self) -> MutexGuard<'_, SessionStateMachine> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.machine().state()
    }

    /// Counters for commands sent and tokens decoded.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.machine().stats()
    }

    /// Number of buffered lines not yet drained by `receive`.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The configuration this session was started with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn write_line(&self, line: &str) -> Result<(), SessionError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(SessionError::Closed)?;
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Encode `command` and write it to the engine.
    ///
    /// No acknowledgement is awaited. Returns the exact line sent, without
    /// the terminator.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` after shutdown, or `SessionError::Io`
    /// if the engine's stdin is broken.
    pub async fn send(&self, command: &Command) -> Result<String, SessionError> {
        if !self.state().accepts_commands() {
            return Err(SessionError::Closed);
        }

        let line = command.encode();
        self.write_line(&line).await.inspect_err(|e| {
            tracing::warn!(command = %line, error = %e, "Failed to send command");
        })?;
        self.machine().record_command();
        tracing::debug!(command = %line, "Sent command");
        Ok(line)
    }

    /// [`receive_timeout`](Self::receive_timeout) with the configured default.
    ///
    /// # Errors
    ///
    /// See [`receive_timeout`](Self::receive_timeout).
    pub async fn receive(&self) -> Result<Vec<ResponseToken>, SessionError> {
        self.receive_timeout(self.config.receive_timeout()).await
    }

    /// Wait up to `timeout` for output, then drain and decode all of it.
    ///
    /// An empty vector means nothing arrived in time; that is not an error.
    /// Tokens are returned in arrival order.
    ///
    /// # Errors
    ///
    /// - `SessionError::Decode` if a drained line is malformed. The tokens
    ///   decoded before it are carried in the error and the lines after it
    ///   stay queued for the next call.
    /// - `SessionError::StreamClosed` once the engine's output has ended and
    ///   every buffered line has been returned.
    pub async fn receive_timeout(&self, timeout: Duration) -> Result<Vec<ResponseToken>, SessionError> {
        if self.state() == SessionState::Closed {
            return Ok(Vec::new());
        }

        let lines = self
            .queue
            .wait_drain(timeout, self.config.poll_interval())
            .await;

        if lines.is_empty() {
            if self.queue.is_closed() && self.state().accepts_commands() {
                return Err(SessionError::StreamClosed);
            }
            return Ok(Vec::new());
        }

        self.decode_batch(lines)
    }

    fn decode_batch(&self, lines: Vec<String>) -> Result<Vec<ResponseToken>, SessionError> {
        let mut tokens = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            match decode(line) {
                Ok(token) => {
                    tracing::debug!(line = %line, "Received");
                    tokens.push(token);
                }
                Err(source) => {
                    self.queue.requeue_front(lines[index + 1..].to_vec());
                    let mut machine = self.machine();
                    machine.record_tokens(tokens.len());
                    machine.record_decode_error();
                    drop(machine);
                    tracing::warn!(error = %source, "Malformed engine output");
                    return Err(SessionError::Decode {
                        source,
                        decoded: tokens,
                    });
                }
            }
        }

        self.machine().record_tokens(tokens.len());
        Ok(tokens)
    }

    /// Keep receiving until a token satisfies `done` or `timeout` elapses.
    ///
    /// Returns everything collected, including any tokens that arrived in the
    /// same batch after the matching one.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`receive_timeout`](Self::receive_timeout). A
    /// `SessionError::Decode` carries every token collected before the
    /// malformed line, across all batches. `SessionError::StreamClosed` is
    /// only returned when nothing was collected.
    pub async fn collect_until<F>(&self, done: F, timeout: Duration) -> Result<Vec<ResponseToken>, SessionError>
    where
        F: Fn(&ResponseToken) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut collected = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || self.state() == SessionState::Closed {
                return Ok(collected);
            }

            let batch = match self.receive_timeout(remaining).await {
                Ok(batch) => batch,
                Err(SessionError::Decode { source, decoded }) => {
                    collected.extend(decoded);
                    return Err(SessionError::Decode {
                        source,
                        decoded: collected,
                    });
                }
                // The next call reports the closed stream.
                Err(SessionError::StreamClosed) if !collected.is_empty() => return Ok(collected),
                Err(e) => return Err(e),
            };
            let finished = batch.iter().any(&done);
            collected.extend(batch);
            if finished {
                return Ok(collected);
            }
        }
    }

    /// Best-effort shutdown: `stop`, grace, `quit`, grace, terminate, join.
    ///
    /// Never fails; errors along the way are logged and swallowed. Calling it
    /// again is a no-op.
    pub async fn shutdown(&self) {
        {
            let mut machine = self.machine();
            if !machine.state().accepts_commands() {
                return;
            }
            machine.transition(SessionState::ShuttingDown);
        }
        tracing::info!("Engine session shutting down");

        let grace = self.config.shutdown_grace();
        for command in [Command::Stop, Command::Quit] {
            if let Err(e) = self.write_line(&command.encode()).await {
                tracing::debug!(command = %command, error = %e, "Shutdown command not delivered");
            }
            tokio::time::sleep(grace).await;
        }

        drop(self.writer.lock().await.take());

        if let Some(mut process) = self.process.lock().await.take() {
            match process.try_wait() {
                Ok(Some(status)) => tracing::debug!(%status, "Engine exited"),
                _ => {
                    if let Err(e) = process.graceful_terminate(self.config.terminate_timeout()).await {
                        tracing::warn!(error = %e, "Failed to terminate engine");
                    }
                }
            }
        }

        self.cancel.cancel();
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = reader {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Reader task failed");
            }
        }

        self.machine().transition(SessionState::Closed);
        tracing::info!(stats = ?self.stats(), "Engine session closed");
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        // The child itself is killed on drop.
        self.cancel.cancel();
    }
}
