// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrapoliceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown notification backend: {0} (expected \"slack\" or \"slack_bot\")")]
    UnknownNotifier(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid command: {0} (expected \"init\" or \"plan\")")]
    InvalidCommand(String),

    #[error("Notification failed: {0}")]
    NotifyError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TerrapoliceError>;
