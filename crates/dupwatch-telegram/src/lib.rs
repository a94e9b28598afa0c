// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for dupwatch.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for group text messages, and plain-text replies threaded
//! to the message that triggered them.

pub mod handler;

use std::sync::Arc;

use async_trait::async_trait;
use dupwatch_config::model::TelegramConfig;
use dupwatch_core::error::DupwatchError;
use dupwatch_core::traits::{ChannelAdapter, PluginAdapter};
use dupwatch_core::types::{AdapterType, HealthStatus, InboundMessage, MessageId, OutboundMessage};
use teloxide::prelude::*;
use teloxide::types::{Recipient, ReplyParameters};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the queue between the poller task and the dedup loop.
const INBOUND_QUEUE_CAPACITY: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects to Telegram via long polling, forwards text messages from
/// watched groups, and posts duplicate reports back into the chat.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: TelegramConfig) -> Result<Self, DupwatchError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            DupwatchError::Config(
                "telegram.bot_token is required (set BOT_TOKEN or DUPWATCH_TELEGRAM_BOT_TOKEN)"
                    .into(),
            )
        })?;

        if token.trim().is_empty() {
            return Err(DupwatchError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, DupwatchError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), DupwatchError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), DupwatchError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let allowed_chats: Arc<Vec<i64>> = Arc::new(self.config.allowed_chats.clone());

        info!(
            allowed_chats = allowed_chats.len(),
            "starting Telegram long polling"
        );

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                let allowed = allowed_chats.clone();
                async move {
                    if !handler::is_group(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-group message");
                        return respond(());
                    }

                    if !handler::is_allowed_chat(&msg, &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring chat outside allowlist");
                        return respond(());
                    }

                    match handler::to_inbound_message(&msg) {
                        Some(inbound) => {
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring non-text message");
                        }
                    }

                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DupwatchError> {
        let mut request = self
            .bot
            .send_message(Recipient::Id(teloxide::types::ChatId(msg.chat_id.0)), &msg.content);

        if let Some(reply) = reply_parameters(msg.reply_to.as_ref()) {
            request = request.reply_parameters(reply);
        }

        let sent = request.await.map_err(|e| DupwatchError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundMessage, DupwatchError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| DupwatchError::ChannelClosed {
            channel: "telegram".into(),
        })
    }
}

/// Reply threading for a platform message ID. Telegram message IDs are i32;
/// anything else is sent without threading.
fn reply_parameters(reply_to: Option<&MessageId>) -> Option<ReplyParameters> {
    reply_to
        .and_then(|id| id.0.parse::<i32>().ok())
        .map(|id| ReplyParameters::new(teloxide::types::MessageId(id)).allow_sending_without_reply())
}
