// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound messages
//! and captured outbound messages for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use dupwatch_core::DupwatchError;
use dupwatch_core::traits::adapter::PluginAdapter;
use dupwatch_core::traits::channel::ChannelAdapter;
use dupwatch_core::types::{
    AdapterType, ChatId, HealthStatus, InboundMessage, MessageId, OutboundMessage, Sender,
};

/// Build a group text message event.
pub fn inbound_text(chat: i64, sender: Sender, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("in-{}", uuid::Uuid::new_v4())),
        channel: "mock".to_string(),
        chat_id: ChatId(chat),
        sender,
        text: text.to_string(),
    }
}

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: Messages injected via `inject_message()` are returned by `receive()`
/// - **sent**: Messages passed to `send()` are captured and retrievable via `sent_messages()`
///
/// After `close()`, `receive()` drains what is queued and then reports a
/// closed channel. Clones share all state, so a test can keep one handle
/// while the code under test owns another.
#[derive(Clone)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    closed: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            closed: Arc::new(AtomicBool::new(false)),
            fail_sends: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Inject an inbound message into the receive queue.
    ///
    /// The next call to `receive()` will return this message.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Stop accepting messages. Queued messages are still delivered.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Make every subsequent `send()` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, DupwatchError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DupwatchError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), DupwatchError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DupwatchError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DupwatchError::Channel {
                message: "mock send failure".to_string(),
                source: None,
            });
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundMessage, DupwatchError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(DupwatchError::ChannelClosed {
                    channel: "mock".to_string(),
                });
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(content: &str) -> OutboundMessage {
        OutboundMessage {
            chat_id: ChatId(-100),
            content: content.to_string(),
            reply_to: None,
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_messages() {
        let channel = MockChannel::new();
        channel
            .inject_message(inbound_text(-100, Sender::new(7, "Andre"), "hello"))
            .await;

        let received = channel.receive().await.unwrap();
        assert_eq!(received.sender.id, 7);
        assert_eq!(received.text, "hello");
        assert_eq!(received.chat_id, ChatId(-100));
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let msg_id = channel.send(reply("response text")).await.unwrap();
        assert!(msg_id.0.starts_with("mock-msg-"));

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "response text");
    }

    #[tokio::test]
    async fn multiple_messages_in_order() {
        let channel = MockChannel::new();
        channel.inject_message(inbound_text(1, Sender::new(1, "A"), "first")).await;
        channel.inject_message(inbound_text(1, Sender::new(1, "A"), "second")).await;

        assert_eq!(channel.receive().await.unwrap().text, "first");
        assert_eq!(channel.receive().await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let channel = Arc::new(MockChannel::new());
        let channel_clone = channel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            channel_clone
                .inject_message(inbound_text(1, Sender::new(1, "A"), "delayed"))
                .await;
        });

        let received = tokio::time::timeout(tokio::time::Duration::from_secs(2), channel.receive())
            .await
            .expect("receive timed out")
            .unwrap();
        assert_eq!(received.text, "delayed");
    }

    #[tokio::test]
    async fn close_drains_queue_then_errors() {
        let channel = MockChannel::new();
        channel.inject_message(inbound_text(1, Sender::new(1, "A"), "last")).await;
        channel.close();

        assert_eq!(channel.receive().await.unwrap().text, "last");
        let err = channel.receive().await.unwrap_err();
        assert!(err.is_channel_closed());
    }

    #[tokio::test]
    async fn failing_sends_are_not_captured() {
        let channel = MockChannel::new();
        channel.fail_sends(true);
        assert!(channel.send(reply("nope")).await.is_err());
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let channel = MockChannel::new();
        let handle = channel.clone();
        channel.send(reply("shared")).await.unwrap();
        assert_eq!(handle.sent_count().await, 1);

        handle.close();
        assert!(channel.receive().await.unwrap_err().is_channel_closed());
    }

    #[tokio::test]
    async fn sent_count_and_clear() {
        let channel = MockChannel::new();
        assert_eq!(channel.sent_count().await, 0);

        channel.send(reply("test")).await.unwrap();
        channel.send(reply("test")).await.unwrap();
        assert_eq!(channel.sent_count().await, 2);

        channel.clear_sent().await;
        assert_eq!(channel.sent_count().await, 0);
    }
}
