// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the external tool with `tokio::process::Command`, streams both pipes
//! to the shared output sink and hands back a [`CommandResult`].
//!
//! - [`context`] holds the deadline-bound [`RunContext`].
//! - [`command_runner`] spawns, waits for and (on cancellation) kills one
//!   child process.
//! - [`output_reader`] drains a single stream into the sink and a buffer.
//! - [`backend`] provides the `CommandRunner` trait and the production
//!   `ProcessRunner`.

use std::fmt;

use tokio::sync::mpsc;

use crate::types::{CommandKind, Directory, StreamKind};

pub mod backend;
pub mod command_runner;
pub mod context;
pub mod output_reader;

pub use backend::{CommandRunner, ProcessRunner, RunFuture};
pub use command_runner::run_command;
pub use context::RunContext;
pub use output_reader::read_output;

/// One line of child output, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub directory: Directory,
    pub stream: StreamKind,
    pub text: String,
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.directory, self.stream, self.text)
    }
}

/// Producer side of the shared output sink.
pub type LineSink = mpsc::Sender<OutputLine>;

/// How a command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitState {
    /// The process exited by itself. `None` when it was killed by a signal.
    Exited(Option<i32>),
    /// Killed because the run deadline passed.
    TimedOut,
    /// Killed because shutdown was requested before the deadline.
    Interrupted,
    /// Could not be started (spawn or pipe setup failed).
    StartFailed(String),
    /// Started, but waiting for it failed before the deadline.
    WaitFailed(String),
}

impl ExitState {
    pub fn succeeded(&self) -> bool {
        matches!(self, ExitState::Exited(Some(0)))
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Exited(Some(code)) => write!(f, "exit {code}"),
            ExitState::Exited(None) => f.write_str("killed by signal"),
            ExitState::TimedOut => f.write_str("timed out"),
            ExitState::Interrupted => f.write_str("interrupted"),
            ExitState::StartFailed(_) => f.write_str("failed to start"),
            ExitState::WaitFailed(_) => f.write_str("wait failed"),
        }
    }
}

/// Captured outcome of one init or plan invocation.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub kind: CommandKind,
    pub directory: Directory,
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitState,
}

impl CommandResult {
    pub fn new(
        kind: CommandKind,
        directory: Directory,
        stdout: String,
        stderr: String,
        exit: ExitState,
    ) -> Self {
        Self {
            kind,
            directory,
            stdout,
            stderr,
            exit,
        }
    }

    pub fn start_failed(kind: CommandKind, directory: Directory, reason: String) -> Self {
        Self::new(kind, directory, String::new(), String::new(), ExitState::StartFailed(reason))
    }

    pub fn succeeded(&self) -> bool {
        self.exit.succeeded()
    }

    pub fn timed_out(&self) -> bool {
        self.exit == ExitState::TimedOut
    }
}
