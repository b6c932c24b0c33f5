// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{
    ConfigFile, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_TOOL, RawConfigFile,
};
use crate::errors::{Result, TerrapoliceError};
use crate::types::NotifierKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TerrapoliceError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_directories(&raw)?;
        let timeout = effective_timeout(raw.timeout)?;
        let concurrency = effective_concurrency(raw.concurrency)?;
        let tool = effective_tool(raw.tool.as_deref())?;
        let notification = raw
            .notification
            .as_deref()
            .map(str::parse::<NotifierKind>)
            .transpose()?;

        let base_directory = raw
            .base_directory
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let directories = raw
            .directories
            .into_iter()
            .map(|entry| PathBuf::from(entry.path))
            .collect();

        Ok(ConfigFile::new_unchecked(
            base_directory,
            directories,
            timeout,
            notification,
            concurrency,
            tool,
        ))
    }
}

fn ensure_has_directories(cfg: &RawConfigFile) -> Result<()> {
    if cfg.directories.is_empty() {
        return Err(TerrapoliceError::ConfigError(
            "config must list at least one entry in `directories`".to_string(),
        ));
    }
    Ok(())
}

fn effective_timeout(seconds: i64) -> Result<Duration> {
    match seconds {
        0 => Ok(DEFAULT_TIMEOUT),
        s if s < 0 => Err(TerrapoliceError::ConfigError(format!(
            "`timeout` must be greater than 0 (got {s})"
        ))),
        s => Ok(Duration::from_secs(s.unsigned_abs())),
    }
}

fn effective_concurrency(concurrency: Option<usize>) -> Result<usize> {
    match concurrency {
        None => Ok(DEFAULT_CONCURRENCY),
        Some(0) => Err(TerrapoliceError::ConfigError(
            "`concurrency` must be >= 1 (got 0)".to_string(),
        )),
        Some(n) => Ok(n),
    }
}

fn effective_tool(tool: Option<&str>) -> Result<String> {
    match tool.map(str::trim) {
        None => Ok(DEFAULT_TOOL.to_string()),
        Some("") => Err(TerrapoliceError::ConfigError(
            "`tool` must not be empty".to_string(),
        )),
        Some(t) => Ok(t.to_string()),
    }
}
