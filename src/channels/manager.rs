//! Channel manager — starts every channel and merges their streams.

use futures::stream::{self, StreamExt};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// Owns all active channels and routes responses back to the right one.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        tracing::debug!(channel = channel.name(), "Registered channel");
        self.channels.push(channel);
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Start every channel and merge their message streams.
    ///
    /// A channel that fails to start is logged and skipped; it is an error
    /// only if none start.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        let mut last_err = None;

        for channel in &self.channels {
            match channel.start().await {
                Ok(s) => {
                    tracing::info!(channel = channel.name(), "Channel started");
                    streams.push(s);
                }
                Err(e) => {
                    tracing::error!(channel = channel.name(), "Channel failed to start: {e}");
                    last_err = Some(e);
                }
            }
        }

        if streams.is_empty() {
            return Err(last_err.unwrap_or_else(|| ChannelError::StartupFailed {
                name: "manager".into(),
                reason: "no channels configured".into(),
            }));
        }

        Ok(stream::select_all(streams).boxed())
    }

    /// Send a response on the channel the message came from.
    pub async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.name() == msg.channel)
            .ok_or_else(|| ChannelError::SendFailed {
                name: msg.channel.clone(),
                reason: "unknown channel".into(),
            })?;
        channel.respond(msg, response).await
    }

    /// Run every channel's health check. Returns the failures.
    pub async fn health_check_all(&self) -> Vec<(String, ChannelError)> {
        let mut failures = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.health_check().await {
                failures.push((channel.name().to_string(), e));
            }
        }
        failures
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = channel.name(), "Channel shutdown failed: {e}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;

    /// In-memory channel that replays fixed messages and records responses.
    struct ScriptedChannel {
        name: &'static str,
        inbox: Vec<&'static str>,
        sent: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self) -> Result<MessageStream, ChannelError> {
            if self.fail_start {
                return Err(ChannelError::StartupFailed {
                    name: self.name.into(),
                    reason: "boom".into(),
                });
            }
            let name = self.name;
            let msgs: Vec<_> = self
                .inbox
                .iter()
                .map(|text| IncomingMessage::new(name, "u1", *text))
                .collect();
            Ok(stream::iter(msgs).boxed())
        }

        async fn respond(
            &self,
            _msg: &IncomingMessage,
            response: OutgoingResponse,
        ) -> Result<(), ChannelError> {
            self.sent.lock().await.push(response.content);
            Ok(())
        }

        async fn health_check(&self) -> Result<(), ChannelError> {
            if self.fail_start {
                Err(ChannelError::Http("down".into()))
            } else {
                Ok(())
            }
        }

        async fn shutdown(&self) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    fn scripted(
        name: &'static str,
        inbox: Vec<&'static str>,
        fail_start: bool,
    ) -> (Box<dyn Channel>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let channel = ScriptedChannel {
            name,
            inbox,
            sent: sent.clone(),
            fail_start,
        };
        (Box::new(channel), sent)
    }

    #[tokio::test]
    async fn merges_streams_from_all_channels() {
        let mut manager = ChannelManager::new();
        let (a, _) = scripted("a", vec!["one", "two"], false);
        let (b, _) = scripted("b", vec!["three"], false);
        manager.add(a);
        manager.add(b);

        let stream = manager.start_all().await.unwrap();
        let mut contents: Vec<String> = stream.map(|m| m.content).collect().await;
        contents.sort();
        assert_eq!(contents, vec!["one", "three", "two"]);
    }

    #[tokio::test]
    async fn respond_routes_by_channel_name() {
        let mut manager = ChannelManager::new();
        let (a, sent_a) = scripted("a", vec![], false);
        let (b, sent_b) = scripted("b", vec![], false);
        manager.add(a);
        manager.add(b);

        let msg = IncomingMessage::new("b", "u1", "hi");
        manager
            .respond(&msg, OutgoingResponse::text("hello b"))
            .await
            .unwrap();

        assert!(sent_a.lock().await.is_empty());
        assert_eq!(*sent_b.lock().await, vec!["hello b".to_string()]);
    }

    #[tokio::test]
    async fn respond_to_unknown_channel_fails() {
        let manager = ChannelManager::new();
        let msg = IncomingMessage::new("nowhere", "u1", "hi");
        let err = manager
            .respond(&msg, OutgoingResponse::text("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }

    #[tokio::test]
    async fn failing_channel_is_skipped() {
        let mut manager = ChannelManager::new();
        let (bad, _) = scripted("bad", vec![], true);
        let (good, _) = scripted("good", vec!["ok"], false);
        manager.add(bad);
        manager.add(good);

        let stream = manager.start_all().await.unwrap();
        let contents: Vec<String> = stream.map(|m| m.content).collect().await;
        assert_eq!(contents, vec!["ok"]);

        let failures = manager.health_check_all().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "bad");
    }

    #[tokio::test]
    async fn start_with_no_channels_fails() {
        let manager = ChannelManager::new();
        assert!(manager.start_all().await.is_err());
    }
}
