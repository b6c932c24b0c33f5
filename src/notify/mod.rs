// src/notify/mod.rs

//! Notification dispatch.
//!
//! Every classified command outcome can be reported through a [`Notifier`].
//! Backends are picked by [`NotifierKind`] via [`build_notifier`]; there is
//! no fallback backend, an unknown or missing identifier is an error.
//!
//! - [`message`] renders the backend-independent text and colours.
//! - [`slack`] posts to an incoming webhook.
//! - [`slack_bot`] posts with a bot token to `chat.postMessage`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::errors::{Result, TerrapoliceError};
use crate::exec::{CommandResult, ExitState};
use crate::types::{CommandKind, Directory, NotifierKind, Status};

pub mod message;
pub mod slack;
pub mod slack_bot;

pub use slack::SlackNotifier;
pub use slack_bot::SlackBotNotifier;

/// Everything a backend needs to report one command outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub status: Status,
    /// Raw tool output: stdout for a finished plan, stderr (or stdout when
    /// stderr is empty) for failures, the start error for start failures.
    pub output: String,
    pub command: CommandKind,
    pub directory: Directory,
    pub timed_out: bool,
}

impl NotifyRequest {
    pub fn from_result(result: &CommandResult, status: Status) -> Self {
        let output = match &result.exit {
            ExitState::StartFailed(reason) => reason.clone(),
            _ if result.succeeded() => result.stdout.clone(),
            _ if result.stderr.trim().is_empty() => result.stdout.clone(),
            _ => result.stderr.clone(),
        };

        Self {
            status,
            output,
            command: result.kind,
            directory: result.directory.clone(),
            timed_out: result.timed_out(),
        }
    }
}

pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Uniform send capability implemented by every backend.
///
/// `cx` is the process-wide shutdown token: a send in flight is abandoned
/// when it fires. It is deliberately not the run deadline, so outcomes of
/// commands cut off by the deadline can still be reported.
pub trait Notifier: Send + Sync {
    /// Backend identifier, for logs.
    fn name(&self) -> &'static str;

    fn send<'a>(&'a self, cx: &'a CancellationToken, request: &'a NotifyRequest) -> NotifyFuture<'a>;
}

/// Backend credentials, normally read from the environment.
#[derive(Debug, Clone, Default)]
pub struct NotifierSettings {
    pub slack_webhook_url: Option<String>,
    pub slack_bot_token: Option<String>,
    pub slack_channel: Option<String>,
}

impl NotifierSettings {
    /// Read `SLACK_WEBHOOK_URL`, `SLACK_BOT_TOKEN` and `SLACK_CHANNEL`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            slack_webhook_url: var("SLACK_WEBHOOK_URL"),
            slack_bot_token: var("SLACK_BOT_TOKEN"),
            slack_channel: var("SLACK_CHANNEL"),
        }
    }
}

/// Build the configured backend.
///
/// Fails when no backend is configured, or when the selected backend's
/// credentials are missing.
pub fn build_notifier(
    kind: Option<NotifierKind>,
    settings: &NotifierSettings,
) -> Result<Arc<dyn Notifier>> {
    let kind = kind.ok_or_else(|| {
        TerrapoliceError::ConfigError(
            "notifications enabled but no `notification` backend configured".to_string(),
        )
    })?;

    match kind {
        NotifierKind::Slack => {
            let url = require(&settings.slack_webhook_url, "SLACK_WEBHOOK_URL", kind)?;
            Ok(Arc::new(SlackNotifier::new(url)?))
        }
        NotifierKind::SlackBot => {
            let token = require(&settings.slack_bot_token, "SLACK_BOT_TOKEN", kind)?;
            let channel = require(&settings.slack_channel, "SLACK_CHANNEL", kind)?;
            Ok(Arc::new(SlackBotNotifier::new(token, channel)?))
        }
    }
}

fn require<'a>(value: &'a Option<String>, var: &str, kind: NotifierKind) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        TerrapoliceError::ConfigError(format!("`{kind}` notifications require {var} to be set"))
    })
}

/// Send an HTTP request unless shutdown wins the race.
pub(crate) async fn deliver(
    cx: &CancellationToken,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    tokio::select! {
        _ = cx.cancelled() => Err(TerrapoliceError::NotifyError(
            "shutdown requested; notification abandoned".to_string(),
        )),
        response = request.send() => Ok(response.context("sending notification request")?),
    }
}
