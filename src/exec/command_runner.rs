// src/exec/command_runner.rs

//! Single tool-invocation runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::exec::output_reader::read_output;
use crate::exec::{CommandResult, ExitState, LineSink, RunContext};
use crate::types::{CommandKind, Directory, StreamKind};

/// Run `<tool> <kind>` inside `directory` and capture both streams.
///
/// Never fails: start errors are folded into a [`ExitState::StartFailed`]
/// result so the caller can classify and report them like any other
/// outcome.
pub async fn run_command(
    tool: &str,
    kind: CommandKind,
    directory: &Directory,
    cx: &RunContext,
    sink: &LineSink,
) -> CommandResult {
    match run_command_inner(tool, kind, directory, cx, sink).await {
        Ok(result) => result,
        Err(err) => {
            error!(
                directory = %directory,
                command = %kind,
                error = %format!("{err:#}"),
                "command could not be started"
            );
            CommandResult::start_failed(kind, directory.clone(), format!("{err:#}"))
        }
    }
}

async fn run_command_inner(
    tool: &str,
    kind: CommandKind,
    directory: &Directory,
    cx: &RunContext,
    sink: &LineSink,
) -> Result<CommandResult> {
    // Once the deadline has fired there is no point starting anything.
    if cx.is_cancelled() {
        let exit = cancelled_exit(cx);
        warn!(directory = %directory, command = %kind, ?exit, "run already cancelled; not starting command");
        return Ok(CommandResult::new(
            kind,
            directory.clone(),
            String::new(),
            String::new(),
            exit,
        ));
    }

    info!(directory = %directory, command = %kind, tool, "starting command");

    let mut cmd = Command::new(tool);
    cmd.arg(kind.as_str())
        .current_dir(directory.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("starting `{tool} {kind}` in {directory}"))?;

    let stdout = child
        .stdout
        .take()
        .context("attaching to child stdout")?;
    let stderr = child
        .stderr
        .take()
        .context("attaching to child stderr")?;

    let stdout_task = tokio::spawn(read_output(
        stdout,
        directory.clone(),
        StreamKind::Stdout,
        sink.clone(),
        cx.token().clone(),
    ));
    let stderr_task = tokio::spawn(read_output(
        stderr,
        directory.clone(),
        StreamKind::Stderr,
        sink.clone(),
        cx.token().clone(),
    ));

    // Readers drain concurrently with the wait so the child never blocks on
    // a full pipe.
    let exit = tokio::select! {
        status_res = child.wait() => match status_res {
            Ok(status) => ExitState::Exited(status.code()),
            Err(err) if cx.deadline_elapsed() => {
                warn!(directory = %directory, command = %kind, error = %err, "wait failed after deadline");
                ExitState::TimedOut
            }
            Err(err) => {
                error!(directory = %directory, command = %kind, error = %err, "failed waiting for command; killing it");
                if let Err(kill_err) = child.start_kill() {
                    warn!(directory = %directory, command = %kind, error = %kill_err, "failed to kill child process");
                }
                ExitState::WaitFailed(err.to_string())
            }
        },
        _ = cx.cancelled() => {
            let exit = cancelled_exit(cx);
            info!(directory = %directory, command = %kind, ?exit, "run cancelled; killing command");
            if let Err(err) = child.kill().await {
                warn!(directory = %directory, command = %kind, error = %err, "failed to kill child process");
            }
            exit
        }
    };

    // Readers run to end-of-input (bounded after cancellation), so the
    // buffers are complete once both are joined.
    let stdout = join_reader(stdout_task, directory, StreamKind::Stdout).await;
    let stderr = join_reader(stderr_task, directory, StreamKind::Stderr).await;

    match &exit {
        ExitState::Exited(code) => info!(
            directory = %directory,
            command = %kind,
            exit_code = code.unwrap_or(-1),
            success = exit.succeeded(),
            "command exited"
        ),
        ExitState::TimedOut => warn!(directory = %directory, command = %kind, timed_out = true, "command timed out"),
        other => debug!(directory = %directory, command = %kind, exit = ?other, "command finished"),
    }

    Ok(CommandResult::new(kind, directory.clone(), stdout, stderr, exit))
}

fn cancelled_exit(cx: &RunContext) -> ExitState {
    if cx.deadline_elapsed() {
        ExitState::TimedOut
    } else {
        ExitState::Interrupted
    }
}

async fn join_reader(task: JoinHandle<String>, directory: &Directory, stream: StreamKind) -> String {
    match task.await {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!(directory = %directory, %stream, error = %err, "stream reader task failed");
            String::new()
        }
    }
}
