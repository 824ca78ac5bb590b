//! The bot main loop: reads every channel, dispatches commands, replies.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::bot::commands::{Command, CommandParser};
use crate::bot::replies;
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::dialog::{DialogInput, RegistrationDialog, session_key};
use crate::error::Error;

/// Channel allowed to stop the service with `exit`.
const CONSOLE_CHANNEL: &str = "cli";

/// Bot settings.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// URL opened by the dashboard button.
    pub dashboard_url: String,
}

/// Fleet bot: owns the channels and the registration dialog.
pub struct FleetBot {
    config: BotConfig,
    channels: Arc<ChannelManager>,
    dialog: Arc<RegistrationDialog>,
}

impl FleetBot {
    pub fn new(config: BotConfig, channels: ChannelManager, dialog: Arc<RegistrationDialog>) -> Self {
        Self {
            config,
            channels: Arc::new(channels),
            dialog,
        }
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Run until Ctrl+C, a console `exit`, or every channel stream ends.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        // Sweep abandoned dialogs when an idle timeout is configured
        let pruning_handle = self.dialog.sessions().idle_timeout().map(|timeout| {
            let sessions = self.dialog.sessions().clone();
            let every = timeout.clamp(Duration::from_secs(1), Duration::from_secs(600));
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(every);
                interval.tick().await; // Skip immediate first tick
                loop {
                    interval.tick().await;
                    sessions.prune_expired().await;
                }
            })
        });

        tracing::info!(channels = ?self.channels.names(), "Fleet bot ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            match self.handle_message(&message).await {
                Some(response) => {
                    if let Err(e) = self.channels.respond(&message, response).await {
                        tracing::error!(channel = %message.channel, "Failed to send reply: {e}");
                    }
                }
                None => {
                    tracing::info!("Shutdown command received, exiting...");
                    let _ = self
                        .channels
                        .respond(&message, OutgoingResponse::text(replies::SHUTDOWN))
                        .await;
                    break;
                }
            }
        }

        tracing::info!("Fleet bot shutting down...");
        if let Some(handle) = pruning_handle {
            handle.abort();
        }
        self.channels.shutdown_all().await?;

        Ok(())
    }

    // ── Message dispatch ────────────────────────────────────────────

    /// Handle one message. `None` means the service should stop.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<OutgoingResponse> {
        let command = CommandParser::parse(&message.content);
        let key = session_key(&message.channel, &message.user_id);

        tracing::debug!(
            channel = %message.channel,
            user = %message.user_id,
            ?command,
            "Received message"
        );

        let input = match command {
            Command::Start => {
                return Some(
                    OutgoingResponse::text(replies::welcome(message.display_name()))
                        .with_markup(replies::dashboard_button(&self.config.dashboard_url)),
                );
            }
            Command::Help => return Some(OutgoingResponse::markdown(replies::HELP)),
            Command::About => return Some(OutgoingResponse::markdown(replies::ABOUT)),
            Command::Quit if message.channel == CONSOLE_CHANNEL => return None,
            // A bare `exit` elsewhere is ordinary text
            Command::Quit if !message.content.trim_start().starts_with('/') => {
                DialogInput::Text(message.content.trim().to_string())
            }
            Command::Quit | Command::Unknown(_) => {
                return Some(OutgoingResponse::text(replies::UNKNOWN_COMMAND));
            }
            Command::Add => DialogInput::Start,
            Command::Cancel => DialogInput::Cancel,
            Command::Text(text) => DialogInput::Text(text),
        };

        let reply = self.dialog.handle(&key, input).await;
        Some(if reply.markdown {
            OutgoingResponse::markdown(reply.text)
        } else {
            OutgoingResponse::text(reply.text)
        })
    }
}
