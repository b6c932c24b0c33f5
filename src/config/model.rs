// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Directory, NotifierKind};

/// Deadline applied when `timeout` is missing or zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Worker pool size when `concurrency` is not configured.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// External binary invoked with `init` / `plan`.
pub const DEFAULT_TOOL: &str = "terraform";

/// Configuration as read from disk, before defaults and validation.
///
/// ```json
/// {
///   "base_directory": "infra",
///   "directories": [{ "path": "network" }, { "path": "app/prod" }],
///   "timeout": 600,
///   "notification": "slack_bot",
///   "concurrency": 4
/// }
/// ```
///
/// The same keys are accepted from a `.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Directory every `directories[].path` is joined onto.
    #[serde(default)]
    pub base_directory: Option<String>,

    #[serde(default)]
    pub directories: Vec<DirectoryEntry>,

    /// Whole-pass deadline in seconds. `0` or missing means the default;
    /// negative values are rejected.
    #[serde(default)]
    pub timeout: i64,

    /// Notification backend identifier (`"slack"` or `"slack_bot"`).
    /// Older config files spell the key `norification`.
    #[serde(default, alias = "norification")]
    pub notification: Option<String>,

    #[serde(default)]
    pub concurrency: Option<usize>,

    #[serde(default)]
    pub tool: Option<String>,
}

/// One `{ "path": "..." }` entry of `directories`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
}

/// Validated configuration with defaults applied.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub base_directory: PathBuf,
    pub directories: Vec<PathBuf>,
    pub timeout: Duration,
    pub notification: Option<NotifierKind>,
    pub concurrency: usize,
    pub tool: String,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        base_directory: PathBuf,
        directories: Vec<PathBuf>,
        timeout: Duration,
        notification: Option<NotifierKind>,
        concurrency: usize,
        tool: String,
    ) -> Self {
        Self {
            base_directory,
            directories,
            timeout,
            notification,
            concurrency,
            tool,
        }
    }

    /// Directories in configured order, joined onto `base_directory`.
    pub fn resolved_directories(&self) -> Vec<Directory> {
        self.directories
            .iter()
            .map(|rel| Directory::resolve(&self.base_directory, rel))
            .collect()
    }
}
