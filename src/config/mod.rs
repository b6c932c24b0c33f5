// src/config/mod.rs

//! Configuration loading and validation for terrapolice.
//!
//! Responsibilities:
//! - Define the JSON/TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants and apply defaults (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_TOOL, DirectoryEntry,
    RawConfigFile,
};
