// src/engine/pool.rs

//! Fixed-size worker pool over the directory list.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::classify::classify_result;
use crate::engine::report::{CommandSummary, DirectoryReport};
use crate::exec::{CommandResult, CommandRunner, LineSink, RunContext};
use crate::notify::{Notifier, NotifyRequest};
use crate::types::{CommandKind, Directory, Status};

type WorkQueue = Arc<Mutex<mpsc::Receiver<Directory>>>;

/// Spawns `concurrency` workers that share a pre-filled, closed queue.
pub struct WorkerPool {
    concurrency: usize,
    runner: Arc<dyn CommandRunner>,
    notifier: Option<Arc<dyn Notifier>>,
    shutdown: CancellationToken,
}

/// State every worker needs; dropped with the last worker so the sink
/// sender it carries goes away too.
struct WorkerShared {
    runner: Arc<dyn CommandRunner>,
    notifier: Option<Arc<dyn Notifier>>,
    shutdown: CancellationToken,
    cx: RunContext,
    sink: LineSink,
}

impl WorkerPool {
    pub fn new(
        concurrency: usize,
        runner: Arc<dyn CommandRunner>,
        notifier: Option<Arc<dyn Notifier>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            runner,
            notifier,
            shutdown,
        }
    }

    /// Process every directory and return one report per directory, in
    /// completion order.
    ///
    /// Takes ownership of `sink`; all clones of it are dropped by the time
    /// this returns.
    pub async fn run(
        &self,
        directories: Vec<Directory>,
        cx: &RunContext,
        sink: LineSink,
    ) -> Vec<DirectoryReport> {
        let total = directories.len();
        if total == 0 {
            return Vec::new();
        }

        let (tx, rx) = mpsc::channel::<Directory>(total);
        for directory in directories {
            if tx.try_send(directory).is_err() {
                // Capacity equals the directory count; this cannot be full.
                warn!("work queue rejected a directory");
            }
        }
        drop(tx);
        let queue: WorkQueue = Arc::new(Mutex::new(rx));

        let shared = Arc::new(WorkerShared {
            runner: Arc::clone(&self.runner),
            notifier: self.notifier.clone(),
            shutdown: self.shutdown.clone(),
            cx: cx.clone(),
            sink,
        });

        let workers = self.concurrency.min(total);
        info!(directories = total, workers, "starting worker pool");

        let mut set = JoinSet::new();
        for id in 0..workers {
            set.spawn(worker_loop(id, Arc::clone(&queue), Arc::clone(&shared)));
        }
        drop(shared);

        let mut reports = Vec::with_capacity(total);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(mut worker_reports) => reports.append(&mut worker_reports),
                Err(err) => error!(error = %err, "worker task failed"),
            }
        }

        info!(directories = reports.len(), "worker pool finished");
        reports
    }
}

async fn worker_loop(id: usize, queue: WorkQueue, shared: Arc<WorkerShared>) -> Vec<DirectoryReport> {
    let mut reports = Vec::new();

    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(directory) = next else {
            break;
        };

        debug!(worker = id, directory = %directory, "worker picked up directory");
        reports.push(process_directory(&shared, directory).await);
    }

    debug!(worker = id, processed = reports.len(), "worker finished");
    reports
}

/// init, then plan only if init succeeded.
async fn process_directory(shared: &WorkerShared, directory: Directory) -> DirectoryReport {
    let init = shared
        .runner
        .run(CommandKind::Init, &directory, &shared.cx, &shared.sink)
        .await;
    let init_status = report_outcome(shared, &init).await;
    let init_summary = CommandSummary::new(&init, init_status);

    if !init.succeeded() {
        error!(
            directory = %directory,
            exit = %init.exit,
            timed_out = init.timed_out(),
            "terraform init failed; skipping plan for this directory"
        );
        return DirectoryReport {
            directory,
            init: init_summary,
            plan: None,
        };
    }

    let plan = shared
        .runner
        .run(CommandKind::Plan, &directory, &shared.cx, &shared.sink)
        .await;
    let plan_status = report_outcome(shared, &plan).await;

    if !plan.succeeded() {
        error!(
            directory = %directory,
            exit = %plan.exit,
            timed_out = plan.timed_out(),
            "terraform plan failed"
        );
    }

    DirectoryReport {
        directory,
        init: init_summary,
        plan: Some(CommandSummary::new(&plan, plan_status)),
    }
}

/// Classify a finished command and, when enabled, notify about it.
///
/// Notification errors are logged and otherwise ignored.
async fn report_outcome(shared: &WorkerShared, result: &CommandResult) -> Option<Status> {
    let status = classify_result(result)?;

    info!(
        directory = %result.directory,
        command = %result.kind,
        %status,
        timed_out = result.timed_out(),
        "command classified"
    );

    if let Some(notifier) = &shared.notifier {
        let request = NotifyRequest::from_result(result, status);
        match notifier.send(&shared.shutdown, &request).await {
            Ok(()) => debug!(
                directory = %result.directory,
                command = %result.kind,
                backend = notifier.name(),
                "notification sent"
            ),
            Err(err) => error!(
                directory = %result.directory,
                command = %result.kind,
                backend = notifier.name(),
                error = %err,
                "notification failed"
            ),
        }
    }

    Some(status)
}
