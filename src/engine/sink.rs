// src/engine/sink.rs

//! The shared output sink: many producers, one printing consumer.

use std::io::Write;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::exec::{LineSink, OutputLine};

/// Buffered lines between readers and the printer.
pub const SINK_CAPACITY: usize = 256;

/// Owner of the sink channel and its consumer task.
///
/// Producers hold clones of [`OutputSink::sender`]. The channel closes once
/// [`OutputSink::close`] has dropped the owner's sender and every producer
/// clone is gone; `close` consumes `self`, so it can only happen once.
#[derive(Debug)]
pub struct OutputSink {
    tx: LineSink,
    consumer: JoinHandle<usize>,
}

impl OutputSink {
    /// Spawn the consumer, writing `"{directory} [{stream}]: {text}"` lines
    /// to `writer`.
    pub fn spawn<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<OutputLine>(SINK_CAPACITY);
        let consumer = tokio::spawn(consume(rx, writer));
        Self { tx, consumer }
    }

    pub fn sender(&self) -> LineSink {
        self.tx.clone()
    }

    /// Drop the owner's sender and wait for the consumer to drain the
    /// remaining lines. Returns the number of lines received.
    pub async fn close(self) -> usize {
        let Self { tx, consumer } = self;
        drop(tx);
        match consumer.await {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "output sink consumer failed");
                0
            }
        }
    }
}

async fn consume<W: Write>(mut rx: mpsc::Receiver<OutputLine>, mut writer: W) -> usize {
    let mut count = 0;
    let mut writable = true;

    while let Some(line) = rx.recv().await {
        count += 1;
        if !writable {
            continue;
        }
        // Keep draining even if the writer breaks, so producers never stall.
        if let Err(err) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            warn!(error = %err, "failed to write output line; discarding further output");
            writable = false;
        }
    }

    debug!(lines = count, "output sink closed");
    count
}
