#![allow(dead_code)]

use std::time::Duration;

use terrapolice::config::{ConfigFile, DirectoryEntry, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Goes through the same validation as a config file on disk; `timeout`
/// can additionally be set below one second, which the file format cannot
/// express.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    timeout_override: Option<Duration>,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
            timeout_override: None,
        }
    }

    pub fn base_directory(mut self, base: impl AsRef<std::path::Path>) -> Self {
        self.config.base_directory = Some(base.as_ref().display().to_string());
        self
    }

    pub fn with_directory(mut self, path: &str) -> Self {
        self.config.directories.push(DirectoryEntry {
            path: path.to_string(),
        });
        self
    }

    pub fn timeout_secs(mut self, secs: i64) -> Self {
        self.config.timeout = secs;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = Some(n);
        self
    }

    pub fn notification(mut self, id: &str) -> Self {
        self.config.notification = Some(id.to_string());
        self
    }

    pub fn tool(mut self, tool: &str) -> Self {
        self.config.tool = Some(tool.to_string());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        let timeout_override = self.timeout_override;
        let mut cfg =
            ConfigFile::try_from(self.config).expect("Failed to build valid config from builder");
        if let Some(timeout) = timeout_override {
            cfg.timeout = timeout;
        }
        cfg
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
