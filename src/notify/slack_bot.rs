// src/notify/slack_bot.rs

//! Bot-token backend using `chat.postMessage`.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{Result, TerrapoliceError};
use crate::notify::message::{attachment, headline};
use crate::notify::{NotifyFuture, NotifyRequest, Notifier, deliver};

const DEFAULT_API_URL: &str = "https://slack.com/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack Web API answers 200 even on failure; `ok` carries the verdict.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlackBotNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
    api_url: String,
}

impl SlackBotNotifier {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client for slack bot")?;
        Ok(Self {
            client,
            token: token.into(),
            channel: channel.into(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Point the notifier at a different Web API root (e.g. a proxy).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post(&self, cx: &CancellationToken, request: &NotifyRequest) -> Result<()> {
        let payload = json!({
            "channel": self.channel,
            "text": headline(request),
            "attachments": [attachment(request)],
        });

        let url = format!("{}/chat.postMessage", self.api_url);
        let response = deliver(
            cx,
            self.client
                .post(&url)
                .bearer_auth(&self.token)
                .json(&payload),
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TerrapoliceError::NotifyError(format!(
                "slack API returned HTTP {}",
                status.as_u16()
            )));
        }

        let reply: PostMessageResponse = response
            .json()
            .await
            .context("decoding chat.postMessage response")?;
        if !reply.ok {
            return Err(TerrapoliceError::NotifyError(format!(
                "chat.postMessage failed: {}",
                reply.error.as_deref().unwrap_or("unknown error")
            )));
        }

        debug!(
            directory = %request.directory,
            command = %request.command,
            channel = %self.channel,
            "slack bot posted message"
        );
        Ok(())
    }
}

impl Notifier for SlackBotNotifier {
    fn name(&self) -> &'static str {
        "slack_bot"
    }

    fn send<'a>(&'a self, cx: &'a CancellationToken, request: &'a NotifyRequest) -> NotifyFuture<'a> {
        Box::pin(self.post(cx, request))
    }
}
