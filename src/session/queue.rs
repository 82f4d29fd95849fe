//! Thread-safe buffer of raw engine lines awaiting decoding.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct QueueState {
    lines: VecDeque<String>,
    closed: bool,
}

/// FIFO of raw lines shared between the background reader and callers.
///
/// The reader is the only producer. Any number of callers may drain; a drain
/// takes the whole buffer atomically with respect to `push`.
#[derive(Debug, Default)]
pub struct ResponseQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl ResponseQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one line. Empty lines are ignored.
    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        self.lock().lines.push_back(line);
        self.notify.notify_waiters();
    }

    /// Take every buffered line, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        self.lock().lines.drain(..).collect()
    }

    /// Put lines back at the front of the queue, keeping their order.
    pub fn requeue_front(&self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let mut state = self.lock();
        for line in lines.into_iter().rev() {
            state.lines.push_front(line);
        }
        drop(state);
        self.notify.notify_waiters();
    }

    /// Number of buffered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    /// Mark the producer as finished and wake all waiters.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    /// Returns true once the producer has finished.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Wait up to `timeout` for at least one line, then drain everything.
    ///
    /// Returns an empty vector when the timeout elapses first, or when the
    /// queue is closed and empty. Waiting is signal-driven; `poll` bounds the
    /// interval between re-checks.
    pub async fn wait_drain(&self, timeout: Duration, poll: Duration) -> Vec<String> {
        let deadline = Instant::now() + timeout;

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a push between check and await is not lost.
            notified.as_mut().enable();

            let lines = self.drain();
            if !lines.is_empty() || self.is_closed() {
                return lines;
            }

            let now = Instant::now();
            if now >= deadline {
                return Vec::new();
            }
            let wait = poll.max(Duration::from_millis(1)).min(deadline - now);
            let _ = tokio::time::timeout(wait, notified).await;
        }
    }
}
