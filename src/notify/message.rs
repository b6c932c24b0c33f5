// src/notify/message.rs

//! Backend-independent message rendering.
//!
//! Status presentation is a fixed lookup table; nothing here holds state.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::notify::NotifyRequest;
use crate::types::Status;

/// Characters of tool output kept in a message body (the tail is kept,
/// since terraform prints its summary last).
pub const MAX_BODY_CHARS: usize = 3000;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

/// Colour and headline used for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub color: &'static str,
    pub headline: &'static str,
}

pub fn style_for(status: Status) -> StatusStyle {
    match status {
        Status::Success => StatusStyle {
            color: "good",
            headline: ":white_check_mark: No changes",
        },
        Status::DiffDetected => StatusStyle {
            color: "warning",
            headline: ":warning: Diff detected",
        },
        Status::Error => StatusStyle {
            color: "danger",
            headline: ":x: Error",
        },
    }
}

/// Headline for a request; timeouts are worded separately from tool errors.
pub fn headline(request: &NotifyRequest) -> &'static str {
    if request.timed_out {
        ":hourglass: Timed out"
    } else {
        style_for(request.status).headline
    }
}

pub fn title(request: &NotifyRequest) -> String {
    format!("terraform {} in {}", request.command, request.directory)
}

/// Remove terminal colour sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Keep at most `max` trailing characters of `text`.
pub fn truncate_tail(text: &str, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text.to_string();
    }
    let tail: String = text.chars().skip(total - max).collect();
    format!("...(truncated)\n{tail}")
}

/// Message body: cleaned, truncated output in a code block.
pub fn body(request: &NotifyRequest) -> String {
    let cleaned = strip_ansi(&request.output);
    let trimmed = cleaned.trim_end();
    if trimmed.is_empty() {
        return "(no output)".to_string();
    }
    format!("```\n{}\n```", truncate_tail(trimmed, MAX_BODY_CHARS))
}

/// Slack attachment shared by both backends.
pub fn attachment(request: &NotifyRequest) -> Value {
    let style = style_for(request.status);
    json!({
        "color": style.color,
        "title": title(request),
        "fallback": format!("{} - {}", headline(request), title(request)),
        "text": body(request),
        "footer": format!("status: {}", request.status),
    })
}
