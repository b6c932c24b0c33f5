// src/engine/classify.rs

//! Pure status classification of finished commands.

use crate::exec::{CommandResult, ExitState};
use crate::types::{CommandKind, Status};

/// Text `terraform plan` prints when the configuration matches the real
/// infrastructure. Matching depends on the tool's exact wording.
pub const NO_CHANGES_MARKER: &str = "No changes.";

/// Derive the status of one command, or `None` when nothing is reported
/// (a successful init).
///
/// - any failure (non-zero exit, signal, timeout, interruption, start
///   failure) → [`Status::Error`], whatever the output says;
/// - successful plan with [`NO_CHANGES_MARKER`] in stdout →
///   [`Status::Success`];
/// - any other successful plan → [`Status::DiffDetected`].
pub fn classify(kind: CommandKind, exit: &ExitState, stdout: &str) -> Option<Status> {
    if !exit.succeeded() {
        return Some(Status::Error);
    }

    match kind {
        CommandKind::Init => None,
        CommandKind::Plan if stdout.contains(NO_CHANGES_MARKER) => Some(Status::Success),
        CommandKind::Plan => Some(Status::DiffDetected),
    }
}

pub fn classify_result(result: &CommandResult) -> Option<Status> {
    classify(result.kind, &result.exit, &result.stdout)
}
