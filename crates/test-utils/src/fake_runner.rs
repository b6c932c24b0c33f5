use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use terrapolice::exec::{
    CommandResult, CommandRunner, ExitState, LineSink, OutputLine, RunContext, RunFuture,
};
use terrapolice::types::{CommandKind, Directory, StreamKind};

/// Scripted outcome of one fake command.
#[derive(Debug, Clone)]
pub struct Script {
    pub exit: ExitState,
    pub stdout: String,
    pub stderr: String,
    pub delay: Duration,
}

impl Script {
    pub fn ok(stdout: &str) -> Self {
        Self {
            exit: ExitState::Exited(Some(0)),
            stdout: stdout.to_string(),
            stderr: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Self {
            exit: ExitState::Exited(Some(code)),
            stdout: String::new(),
            stderr: stderr.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn start_failure(reason: &str) -> Self {
        Self {
            exit: ExitState::StartFailed(reason.to_string()),
            stdout: String::new(),
            stderr: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A fake runner that:
/// - returns scripted results per (directory, command), defaulting to a
///   successful run with no output;
/// - forwards scripted output lines to the sink like the real reader;
/// - records every invocation and the peak number of commands in flight;
/// - honours run cancellation while "running".
#[derive(Default)]
pub struct FakeRunner {
    scripts: Mutex<HashMap<(PathBuf, CommandKind), Script>>,
    default_delay: Duration,
    invocations: Mutex<Vec<(Directory, CommandKind)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to commands without an explicit script.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn script(self, directory: &Directory, kind: CommandKind, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert((directory.path().to_path_buf(), kind), script);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn invocations(&self) -> Vec<(Directory, CommandKind)> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocations_for(&self, directory: &Directory) -> Vec<CommandKind> {
        self.invocations()
            .into_iter()
            .filter(|(d, _)| d == directory)
            .map(|(_, k)| k)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn execute(
        &self,
        kind: CommandKind,
        directory: &Directory,
        cx: &RunContext,
        sink: &LineSink,
    ) -> CommandResult {
        self.invocations
            .lock()
            .unwrap()
            .push((directory.clone(), kind));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&(directory.path().to_path_buf(), kind))
            .cloned()
            .unwrap_or_else(|| Script::ok("").delayed(self.default_delay));

        let result = tokio::select! {
            _ = tokio::time::sleep(script.delay) => {
                forward(sink, directory, StreamKind::Stdout, &script.stdout).await;
                forward(sink, directory, StreamKind::Stderr, &script.stderr).await;
                CommandResult::new(
                    kind,
                    directory.clone(),
                    script.stdout.clone(),
                    script.stderr.clone(),
                    script.exit.clone(),
                )
            }
            _ = cx.cancelled() => {
                let exit = if cx.deadline_elapsed() {
                    ExitState::TimedOut
                } else {
                    ExitState::Interrupted
                };
                CommandResult::new(kind, directory.clone(), String::new(), String::new(), exit)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

async fn forward(sink: &LineSink, directory: &Directory, stream: StreamKind, text: &str) {
    for line in text.lines() {
        let _ = sink
            .send(OutputLine {
                directory: directory.clone(),
                stream,
                text: line.to_string(),
            })
            .await;
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        kind: CommandKind,
        directory: &'a Directory,
        cx: &'a RunContext,
        sink: &'a LineSink,
    ) -> RunFuture<'a> {
        Box::pin(self.execute(kind, directory, cx, sink))
    }
}
