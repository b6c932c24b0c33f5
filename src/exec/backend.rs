// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The worker pool talks to a `CommandRunner` instead of spawning processes
//! itself. Production uses [`ProcessRunner`]; tests can substitute a runner
//! that returns scripted results without touching the OS.

use std::future::Future;
use std::pin::Pin;

use crate::exec::command_runner::run_command;
use crate::exec::{CommandResult, LineSink, RunContext};
use crate::types::{CommandKind, Directory};

pub type RunFuture<'a> = Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;

/// Runs one tool subcommand in one directory.
///
/// Implementations must honour `cx`: once it is cancelled the returned
/// future has to resolve promptly with a timed-out or interrupted result.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        kind: CommandKind,
        directory: &'a Directory,
        cx: &'a RunContext,
        sink: &'a LineSink,
    ) -> RunFuture<'a>;
}

/// Runner that spawns the configured tool binary.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    tool: String,
}

impl ProcessRunner {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        kind: CommandKind,
        directory: &'a Directory,
        cx: &'a RunContext,
        sink: &'a LineSink,
    ) -> RunFuture<'a> {
        Box::pin(run_command(&self.tool, kind, directory, cx, sink))
    }
}
