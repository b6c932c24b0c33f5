// src/engine/mod.rs

//! Orchestration engine for terrapolice.
//!
//! This module ties together:
//! - the pure status classifier ([`classify`])
//! - the shared output sink ([`sink`])
//! - the fixed-size worker pool running init → plan per directory ([`pool`])
//! - the per-pass coordinator owning deadline and sink lifecycle
//!   ([`coordinator`])
//! - the aggregate pass report ([`report`])

pub mod classify;
pub mod coordinator;
pub mod pool;
pub mod report;
pub mod sink;

pub use classify::{NO_CHANGES_MARKER, classify, classify_result};
pub use coordinator::Coordinator;
pub use pool::WorkerPool;
pub use report::{CommandSummary, DirectoryReport, PassReport};
pub use sink::OutputSink;
