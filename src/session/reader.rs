//! Background reader task.
//!
//! Reads engine stdout one line at a time and appends each non-blank line to
//! the [`ResponseQueue`]. No decoding happens here; lines are decoded when a
//! caller drains the queue.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::queue::ResponseQueue;

/// Strip the line terminator (`\n` or `\r\n`) from a raw line.
fn trim_line_end(buf: &[u8]) -> String {
    let text = String::from_utf8_lossy(buf);
    text.trim_end_matches(['\n', '\r']).to_string()
}

/// Reader loop: runs until EOF, an I/O error, or cancellation.
///
/// The queue is closed when the loop exits so that waiters observe the end of
/// the stream. Invalid UTF-8 is replaced rather than treated as an error.
pub async fn run_reader<R>(stdout: R, queue: Arc<ResponseQueue>, cancel: CancellationToken)
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut stdout = stdout;
    let mut buf = Vec::new();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("uci reader: cancellation received, stopping");
                break;
            }

            read = stdout.read_until(b'\n', &mut buf) => {
                match read {
                    Ok(0) => {
                        debug!("uci reader: engine stdout closed");
                        break;
                    }
                    Ok(_) => {
                        let line = trim_line_end(&buf);
                        buf.clear();
                        if line.trim().is_empty() {
                            continue;
                        }
                        trace!(line = %line, "uci reader: buffered line");
                        queue.push(line);
                    }
                    Err(e) => {
                        warn!(error = %e, "uci reader: read from engine failed");
                        break;
                    }
                }
            }
        }
    }

    queue.close();
}
