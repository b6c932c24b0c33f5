// src/engine/report.rs

//! Per-directory outcome bookkeeping and the end-of-pass summary.

use std::io::{self, Write};

use crate::exec::{CommandResult, ExitState};
use crate::types::{Directory, Status};

/// How one command ended and what it was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub exit: ExitState,
    pub status: Option<Status>,
}

impl CommandSummary {
    pub fn new(result: &CommandResult, status: Option<Status>) -> Self {
        Self {
            exit: result.exit.clone(),
            status,
        }
    }
}

/// Outcome of the init/plan sequence for one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    pub directory: Directory,
    pub init: CommandSummary,
    /// `None` when init failed and plan was skipped.
    pub plan: Option<CommandSummary>,
}

impl DirectoryReport {
    /// Status reported for the directory as a whole: the plan status, or
    /// the init error when plan never ran.
    pub fn status(&self) -> Status {
        self.plan
            .as_ref()
            .and_then(|p| p.status)
            .or(self.init.status)
            .unwrap_or(Status::Error)
    }

    pub fn timed_out(&self) -> bool {
        self.init.exit == ExitState::TimedOut
            || self.plan.as_ref().is_some_and(|p| p.exit == ExitState::TimedOut)
    }
}

/// Aggregate result of one pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub directories: Vec<DirectoryReport>,
    /// Lines printed by the output sink.
    pub lines: usize,
}

impl PassReport {
    pub fn count(&self, status: Status) -> usize {
        self.directories
            .iter()
            .filter(|d| d.status() == status)
            .count()
    }

    pub fn find(&self, directory: &Directory) -> Option<&DirectoryReport> {
        self.directories.iter().find(|d| &d.directory == directory)
    }

    /// Number of subprocess invocations issued (init + plan).
    pub fn invocations(&self) -> usize {
        self.directories
            .iter()
            .map(|d| 1 + usize::from(d.plan.is_some()))
            .sum()
    }

    pub fn write_summary<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "terrapolice summary ({} directories):", self.directories.len())?;
        for report in &self.directories {
            let detail = match &report.plan {
                Some(plan) => format!("plan {}", plan.exit),
                None => format!("init {}, plan skipped", report.init.exit),
            };
            writeln!(out, "  {:<13} {} ({detail})", report.status(), report.directory)?;
        }
        writeln!(
            out,
            "  success: {}, diff_detected: {}, error: {}",
            self.count(Status::Success),
            self.count(Status::DiffDetected),
            self.count(Status::Error)
        )?;
        Ok(())
    }
}
