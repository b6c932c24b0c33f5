// src/exec/output_reader.rs

//! Line-oriented draining of one child stream.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::exec::{LineSink, OutputLine};
use crate::types::{Directory, StreamKind};

/// How long a stream is still drained after cancellation. The killed or
/// exited child closes its pipe well within this; only a grandchild that
/// inherited the pipe can keep it open longer.
pub const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Drain `reader` line by line until end-of-input.
///
/// Every line is appended (plus `\n`) to the returned buffer before it is
/// offered to the sink. Delivery races against `cancel`: once the run is
/// cancelled the pending line and everything after it are no longer
/// forwarded, but reading continues so the buffer stays complete. After
/// cancellation reading is bounded by [`DRAIN_GRACE`].
///
/// Invalid UTF-8 is replaced lossily; a trailing `\r` is trimmed.
pub async fn read_output<R>(
    reader: R,
    directory: Directory,
    stream: StreamKind,
    sink: LineSink,
    cancel: CancellationToken,
) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buffer = String::new();
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut forwarding = true;
    let mut drain_until: Option<Instant> = None;

    loop {
        let segment = match drain_until {
            None => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(directory = %directory, %stream, "run cancelled; draining stream without forwarding");
                    forwarding = false;
                    drain_until = Some(Instant::now() + DRAIN_GRACE);
                    continue;
                }
                next = segments.next_segment() => next,
            },
            Some(until) => match tokio::time::timeout_at(until, segments.next_segment()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(directory = %directory, %stream, "stream still open after cancellation; giving up on the rest");
                    break;
                }
            },
        };

        let bytes = match segment {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break,
            Err(err) => {
                warn!(directory = %directory, %stream, error = %err, "error reading child stream");
                break;
            }
        };

        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if text.ends_with('\r') {
            text.pop();
        }
        buffer.push_str(&text);
        buffer.push('\n');

        if !forwarding {
            continue;
        }

        let line = OutputLine {
            directory: directory.clone(),
            stream,
            text,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(directory = %directory, %stream, "run cancelled while delivering line; buffering only");
                forwarding = false;
                drain_until.get_or_insert_with(|| Instant::now() + DRAIN_GRACE);
            }
            sent = sink.send(line) => {
                if sent.is_err() {
                    // Sink consumer is gone; keep buffering for classification.
                    debug!(directory = %directory, %stream, "output sink closed; buffering only");
                    forwarding = false;
                }
            }
        }
    }

    buffer
}
