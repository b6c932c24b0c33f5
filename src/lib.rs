// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod types;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::Coordinator;
use crate::exec::ProcessRunner;
use crate::notify::{NotifierSettings, build_notifier};

/// Process exit code when the pass ran, whatever the per-directory outcomes.
pub const EXIT_CODE_OK: i32 = 0;

/// Process exit code when the pass could not be started.
pub const EXIT_CODE_ERROR: i32 = 1;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - notifier construction
/// - Ctrl-C handling
/// - the coordinator running the pass
///
/// Only setup failures are returned as errors; a pass where some
/// directories failed still returns `Ok(())`.
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config from {}", args.config))?;

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            bail!("--concurrency must be >= 1");
        }
        cfg.concurrency = concurrency;
    }

    if args.dry_run {
        print_dry_run(&cfg, args.notify);
        return Ok(());
    }

    let notifier = if args.notify {
        Some(build_notifier(cfg.notification, &NotifierSettings::from_env())?)
    } else {
        None
    };

    // Ctrl-C → cancel everything, notifications included.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling pass");
            shutdown.cancel();
        });
    }

    let runner = Arc::new(ProcessRunner::new(cfg.tool.clone()));
    let report = Coordinator::new(cfg, runner, notifier, shutdown)
        .run(std::io::stdout())
        .await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report.write_summary(&mut out)?;
    out.flush()?;

    Ok(())
}

/// Simple dry-run output: print the resolved settings and directories.
fn print_dry_run(cfg: &ConfigFile, notify: bool) {
    println!("terrapolice dry-run");
    println!("  tool = {}", cfg.tool);
    println!("  timeout = {}s", cfg.timeout.as_secs());
    println!("  concurrency = {}", cfg.concurrency);
    match cfg.notification {
        Some(kind) => println!("  notification = {kind} (enabled: {notify})"),
        None => println!("  notification = none (enabled: {notify})"),
    }
    println!();

    let directories = cfg.resolved_directories();
    println!("directories ({}):", directories.len());
    for directory in directories {
        println!("  - {directory}");
    }
}
