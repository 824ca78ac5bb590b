//! Core channel types: incoming messages, outgoing responses, and the trait.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChannelError;

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Name of the channel it arrived on.
    pub channel: String,
    /// Stable per-channel user identifier.
    pub user_id: String,
    /// Display name, when the channel knows one.
    pub user_name: Option<String>,
    pub content: String,
    pub received_at: DateTime<Utc>,
    /// Channel-specific routing data (e.g. Telegram `chat_id`).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            user_id: user_id.into(),
            user_name: None,
            content: content.into(),
            received_at: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Display name, falling back to the user id.
    pub fn display_name(&self) -> &str {
        self.user_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Inline markup attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyMarkup {
    /// A single button that opens a URL as an embedded web app.
    WebAppButton { text: String, url: String },
}

/// A response to send back on a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingResponse {
    pub content: String,
    /// Whether `content` uses Markdown formatting.
    pub markdown: bool,
    pub markup: Option<ReplyMarkup>,
}

impl OutgoingResponse {
    /// Plain-text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            markdown: false,
            markup: None,
        }
    }

    /// Markdown-formatted response.
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            markdown: true,
            ..Self::text(content)
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// Stream of incoming messages.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A transport the bot can receive messages from and reply on.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Unique channel name, used to route responses.
    fn name(&self) -> &str;

    /// Start listening. Messages arrive on the returned stream.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Reply to a message that arrived on this channel.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}
