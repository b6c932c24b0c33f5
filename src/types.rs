use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::TerrapoliceError;

/// The two tool subcommands run per directory, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Init,
    Plan,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Init => "init",
            CommandKind::Plan => "plan",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = TerrapoliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "init" => Ok(CommandKind::Init),
            "plan" => Ok(CommandKind::Plan),
            other => Err(TerrapoliceError::InvalidCommand(other.to_string())),
        }
    }
}

/// Which pipe of the child process a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome status of a classified command.
///
/// Only ever constructed by the classifier or by parsing one of the three
/// canonical names; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    DiffDetected,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::DiffDetected => "diff_detected",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TerrapoliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Status::Success),
            "diff_detected" => Ok(Status::DiffDetected),
            "error" => Ok(Status::Error),
            other => Err(TerrapoliceError::InvalidStatus(other.to_string())),
        }
    }
}

/// Notification backend selected by the `notification` config key.
///
/// - `Slack`: incoming webhook (`SLACK_WEBHOOK_URL`).
/// - `SlackBot`: bot token against `chat.postMessage`
///   (`SLACK_BOT_TOKEN`, `SLACK_CHANNEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Slack,
    SlackBot,
}

impl NotifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifierKind::Slack => "slack",
            NotifierKind::SlackBot => "slack_bot",
        }
    }
}

impl fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NotifierKind {
    type Err = TerrapoliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slack" => Ok(NotifierKind::Slack),
            "slack_bot" => Ok(NotifierKind::SlackBot),
            other => Err(TerrapoliceError::UnknownNotifier(other.to_string())),
        }
    }
}

/// A resolved working directory for one init/plan sequence.
///
/// Built once from `base_directory` + a configured relative path. Two equal
/// directories are still processed independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    path: PathBuf,
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Join a configured relative path onto the base directory.
    pub fn resolve(base: &Path, relative: &Path) -> Self {
        Self::new(base.join(relative))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
