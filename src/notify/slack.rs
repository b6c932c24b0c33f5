// src/notify/slack.rs

//! Incoming-webhook backend.

use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{Result, TerrapoliceError};
use crate::notify::message::{attachment, headline};
use crate::notify::{NotifyFuture, NotifyRequest, Notifier, deliver};

/// HTTP request timeout for a single webhook post.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client for slack webhook")?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    async fn post(&self, cx: &CancellationToken, request: &NotifyRequest) -> Result<()> {
        let payload = json!({
            "text": headline(request),
            "attachments": [attachment(request)],
        });

        let response = deliver(cx, self.client.post(&self.webhook_url).json(&payload)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TerrapoliceError::NotifyError(format!(
                "slack webhook returned HTTP {}",
                status.as_u16()
            )));
        }

        debug!(directory = %request.directory, command = %request.command, "slack webhook accepted message");
        Ok(())
    }
}

impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn send<'a>(&'a self, cx: &'a CancellationToken, request: &'a NotifyRequest) -> NotifyFuture<'a> {
        Box::pin(self.post(cx, request))
    }
}
