// src/exec/context.rs

//! The shared, deadline-bound cancellation context for one pass.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Stand-in deadline for timeouts too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Deadline + cancellation token handed to every blocking call of a pass.
///
/// The token is a child of the process-wide shutdown token, so Ctrl-C
/// cancels it too. The deadline is fixed at construction and never moves.
#[derive(Debug, Clone)]
pub struct RunContext {
    deadline: Instant,
    cancel: CancellationToken,
}

impl RunContext {
    /// Start the deadline clock.
    ///
    /// Spawns a timer task that cancels the context when the deadline
    /// passes; the timer exits early once the context is cancelled for any
    /// other reason (shutdown, [`RunContext::finish`]).
    pub fn with_timeout(shutdown: &CancellationToken, timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let cancel = shutdown.child_token();

        let timer = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    info!(timeout_secs = timeout.as_secs_f64(), "run deadline reached; cancelling in-flight commands");
                    timer.cancel();
                }
                _ = timer.cancelled() => {
                    debug!("run context cancelled before deadline");
                }
            }
        });

        Self { deadline, cancel }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the deadline fires or shutdown is requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Whether the deadline itself has passed, as opposed to a shutdown.
    pub fn deadline_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Stop the deadline timer once every worker has finished.
    pub fn finish(&self) {
        self.cancel.cancel();
    }
}
