// src/engine/coordinator.rs

use std::io::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ConfigFile;
use crate::engine::pool::WorkerPool;
use crate::engine::report::PassReport;
use crate::engine::sink::OutputSink;
use crate::exec::{CommandRunner, RunContext};
use crate::notify::Notifier;
use crate::types::Status;

/// Owns one pass end to end: deadline, sink lifecycle, worker pool.
///
/// Per-directory failures never make [`Coordinator::run`] fail; they only
/// show up in the returned [`PassReport`], the console and notifications.
pub struct Coordinator {
    config: ConfigFile,
    runner: Arc<dyn CommandRunner>,
    notifier: Option<Arc<dyn Notifier>>,
    shutdown: CancellationToken,
}

impl Coordinator {
    pub fn new(
        config: ConfigFile,
        runner: Arc<dyn CommandRunner>,
        notifier: Option<Arc<dyn Notifier>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            runner,
            notifier,
            shutdown,
        }
    }

    /// Run init/plan over every configured directory, printing tool output
    /// to `out`.
    ///
    /// Returns once every worker has finished and the sink has been closed.
    pub async fn run<W>(self, out: W) -> PassReport
    where
        W: Write + Send + 'static,
    {
        let directories = self.config.resolved_directories();
        info!(
            directories = directories.len(),
            concurrency = self.config.concurrency,
            timeout_secs = self.config.timeout.as_secs_f64(),
            tool = %self.config.tool,
            notify = self.notifier.is_some(),
            "starting plan check pass"
        );

        let cx = RunContext::with_timeout(&self.shutdown, self.config.timeout);
        let sink = OutputSink::spawn(out);

        let pool = WorkerPool::new(
            self.config.concurrency,
            self.runner,
            self.notifier,
            self.shutdown.clone(),
        );
        let directories = pool.run(directories, &cx, sink.sender()).await;

        // All workers are done; release the deadline timer and any reader
        // still parked on a pipe, then close the sink.
        cx.finish();
        let lines = sink.close().await;

        let report = PassReport { directories, lines };
        info!(
            success = report.count(Status::Success),
            diff_detected = report.count(Status::DiffDetected),
            error = report.count(Status::Error),
            "plan check pass finished"
        );
        report
    }
}
