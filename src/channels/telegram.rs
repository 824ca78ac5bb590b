//! Telegram channel — long-polls the Bot API for updates.
//!
//! Uses `getUpdates` with an offset, replies via `sendMessage`, and renders
//! [`ReplyMarkup`] as an inline keyboard.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, ReplyMarkup};
use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Delay before retrying after a failed poll.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    api_base: String,
    client: reqwest::Client,
    shutdown: watch::Sender<bool>,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
            shutdown,
        }
    }

    /// Point the channel at a different Bot API server.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.api_base, &self.bot_token, method)
    }

    /// Send a message, splitting it when it exceeds Telegram's 4096 char limit.
    /// Markup is attached to the last chunk only.
    async fn send_message(
        &self,
        chat_id: &str,
        response: &OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(&response.content, TELEGRAM_MAX_MESSAGE_LENGTH);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let markup = if i == last { response.markup.as_ref() } else { None };
            self.send_message_chunk(chat_id, chunk, response.markdown, markup)
                .await?;
        }
        Ok(())
    }

    /// Send a single chunk (≤4096 chars).
    ///
    /// Markdown is tried first with plain-text fallback. If the markup itself
    /// is rejected, the text is sent without it.
    async fn send_message_chunk(
        &self,
        chat_id: &str,
        text: &str,
        markdown: bool,
        markup: Option<&ReplyMarkup>,
    ) -> Result<(), ChannelError> {
        let mut attempts = Vec::with_capacity(3);
        if markdown {
            attempts.push(message_body(chat_id, text, true, markup));
        }
        attempts.push(message_body(chat_id, text, false, markup));
        if markup.is_some() {
            attempts.push(message_body(chat_id, text, false, None));
        }

        let mut failures = Vec::new();
        for body in &attempts {
            let resp = self
                .client
                .post(self.api_url("sendMessage"))
                .json(body)
                .send()
                .await
                .map_err(|e| ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: e.to_string(),
                })?;

            if resp.status().is_success() {
                return Ok(());
            }

            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = ?status,
                parse_mode = body.get("parse_mode").is_some(),
                reply_markup = body.get("reply_markup").is_some(),
                "Telegram sendMessage failed; retrying with a simpler payload"
            );
            failures.push(format!("{status}: {err}"));
        }

        Err(ChannelError::SendFailed {
            name: "telegram".into(),
            reason: format!("sendMessage failed ({})", failures.join("; ")),
        })
    }

    /// Drop any configured webhook so long polling is allowed.
    async fn delete_webhook(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url("deleteWebhook"))
            .json(&serde_json::json!({ "drop_pending_updates": true }))
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::Http(format!(
                "deleteWebhook returned {}",
                resp.status()
            )))
        }
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        if let Err(e) = self.delete_webhook().await {
            tracing::warn!("Telegram deleteWebhook failed: {e}");
        }

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();
        let mut stop = self.shutdown.subscribe();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"]
                });

                let poll = async {
                    let resp = client.post(&url).json(&body).send().await?;
                    resp.json::<serde_json::Value>().await
                };

                let data = tokio::select! {
                    _ = stop.changed() => {
                        tracing::info!("Telegram poller stopped");
                        return;
                    }
                    result = poll => match result {
                        Ok(d) => d,
                        Err(e) => {
                            tracing::warn!("Telegram poll error: {e}");
                            tokio::time::sleep(POLL_BACKOFF).await;
                            continue;
                        }
                    },
                };

                if data.get("ok").and_then(serde_json::Value::as_bool) == Some(false) {
                    let description = data
                        .get("description")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("unknown");
                    tracing::warn!("Telegram getUpdates rejected: {description}");
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                }

                let Some(results) = data.get("result").and_then(serde_json::Value::as_array)
                else {
                    continue;
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64)
                    {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_update(update) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: "No chat_id in message metadata".into(),
            })?;

        self.send_message(chat_id, &response).await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        self.shutdown.send_replace(true);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn api_url(base: &str, token: &SecretString, method: &str) -> String {
    format!("{base}/bot{}/{method}", token.expose_secret())
}

fn message_body(
    chat_id: &str,
    text: &str,
    markdown: bool,
    markup: Option<&ReplyMarkup>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "chat_id": chat_id,
        "text": text,
    });
    if markdown {
        body["parse_mode"] = "Markdown".into();
    }
    if let Some(markup) = markup {
        body["reply_markup"] = inline_keyboard(markup);
    }
    body
}

/// Render markup as a Telegram `InlineKeyboardMarkup`.
fn inline_keyboard(markup: &ReplyMarkup) -> serde_json::Value {
    match markup {
        ReplyMarkup::WebAppButton { text, url } => serde_json::json!({
            "inline_keyboard": [[{ "text": text, "web_app": { "url": url } }]]
        }),
    }
}

/// Turn a `getUpdates` entry into an [`IncomingMessage`].
/// Returns `None` for updates without a text message.
fn parse_update(update: &serde_json::Value) -> Option<IncomingMessage> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;

    let from = message.get("from");
    let username = from
        .and_then(|f| f.get("username"))
        .and_then(|u| u.as_str());
    let user_id = from
        .and_then(|f| f.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string());

    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(|id| id.to_string())
        .unwrap_or_default();

    let first_name = from
        .and_then(|f| f.get("first_name"))
        .and_then(|n| n.as_str());
    let last_name = from
        .and_then(|f| f.get("last_name"))
        .and_then(|n| n.as_str());
    let full_name = match (first_name, last_name) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(first), None) => Some(first.to_string()),
        _ => username.map(String::from),
    };

    // Fall back to the chat id so private chats without `from` still get a session.
    let user = user_id.unwrap_or_else(|| chat_id.clone());

    let mut incoming = IncomingMessage::new("telegram", user, text).with_metadata(
        serde_json::json!({
            "chat_id": chat_id,
            "username": username,
        }),
    );
    if let Some(name) = full_name {
        incoming = incoming.with_user_name(name);
    }
    Some(incoming)
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.chars().count() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Byte offset of the max_len-th char
        let limit = remaining
            .char_indices()
            .nth(max_len)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let chunk = &remaining[..limit];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(limit);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { limit } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────
