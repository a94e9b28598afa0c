// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dedup loop: the central coordinator of a running bot.
//!
//! The [`DedupLoop`]:
//! - Rebuilds in-memory histories from the backup at startup
//! - Receives messages from a channel adapter, one at a time
//! - Runs each through the [`Detector`] and replies with duplicate reports
//! - Writes recorded sightings to the backup and prunes expired ones
//! - Handles graceful shutdown

pub mod shutdown;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use dupwatch_config::model::DedupConfig;
use dupwatch_core::error::DupwatchError;
use dupwatch_core::types::{ChatId, InboundMessage, OutboundMessage};
use dupwatch_core::{ChannelAdapter, Clock, StorageAdapter};
use dupwatch_dedup::{Detector, MessageKey, Outcome, Sighting, backup_record};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Event loop wiring a channel, the detector, and an optional backup.
///
/// The backup is best effort: when `storage` is `None`, or when a write
/// fails, detection carries on from memory alone.
pub struct DedupLoop {
    channel: Box<dyn ChannelAdapter + Send + Sync>,
    storage: Option<Arc<dyn StorageAdapter + Send + Sync>>,
    detector: Detector,
    clock: Arc<dyn Clock>,
}

impl DedupLoop {
    pub fn new(
        channel: Box<dyn ChannelAdapter + Send + Sync>,
        storage: Option<Arc<dyn StorageAdapter + Send + Sync>>,
        config: &DedupConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            history_cap = config.history_cap,
            suppress_window_secs = config.suppress_window_secs,
            retention_days = config.retention_days,
            backup = storage.is_some(),
            "dedup loop initialized"
        );

        Self {
            channel,
            storage,
            detector: Detector::new(config),
            clock,
        }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Load the backup into the detector. Returns the number of sightings applied.
    pub async fn rehydrate(&mut self) -> Result<usize, DupwatchError> {
        let Some(storage) = &self.storage else {
            return Ok(0);
        };

        let records = storage.load_sightings().await?;
        let loaded = records.len();
        let applied = self.detector.rehydrate(records);
        info!(
            loaded,
            applied,
            chats = self.detector.store().chat_count(),
            "rehydrated histories from backup"
        );
        Ok(applied)
    }

    /// Runs the loop until the cancellation token is triggered or the channel closes.
    ///
    /// A failure while handling one message is logged and the loop moves on
    /// to the next message.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), DupwatchError> {
        info!("dedup loop running");

        loop {
            let received = tokio::select! {
                msg = self.channel.receive() => msg,
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dedup loop");
                    break;
                }
            };

            match received {
                Ok(inbound) => {
                    if let Err(e) = self.handle_inbound(inbound).await {
                        error!(error = %e, "failed to handle inbound message");
                    }
                }
                Err(e) if e.is_channel_closed() => {
                    info!(error = %e, "channel closed, stopping dedup loop");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "channel receive error");
                }
            }
        }

        if let Err(e) = self.channel.shutdown().await {
            warn!(error = %e, "channel shutdown failed");
        }
        if let Some(storage) = &self.storage
            && let Err(e) = storage.close().await
        {
            warn!(error = %e, "failed to close backup");
        }

        info!("dedup loop stopped");
        Ok(())
    }

    /// Handles a single inbound message: detect, persist, reply, prune.
    ///
    /// The in-memory update happens before any I/O, so a backup or send
    /// failure never undoes it.
    pub async fn handle_inbound(&mut self, inbound: InboundMessage) -> Result<Outcome, DupwatchError> {
        let now = self.clock.now();
        let chat = inbound.chat_id;

        debug!(
            chat_id = %chat,
            sender_id = inbound.sender.id,
            channel = inbound.channel.as_str(),
            "handling inbound message"
        );

        let outcome = self
            .detector
            .observe(chat, inbound.sender.clone(), &inbound.text, now);

        if let Some((key, sighting)) = outcome.recorded() {
            self.persist(chat, key, sighting).await;
        }

        if let Outcome::Duplicate {
            report,
            history_len,
            ..
        } = &outcome
        {
            info!(
                chat_id = %chat,
                sender_id = inbound.sender.id,
                history_len,
                "duplicate found, sending report"
            );
            let reply = OutboundMessage {
                chat_id: chat,
                content: report.clone(),
                reply_to: Some(inbound.id.clone()),
            };
            let sent = self.channel.send(reply).await;
            self.prune(now).await;
            sent?;
        }

        Ok(outcome)
    }

    async fn persist(&self, chat: ChatId, key: &MessageKey, sighting: &Sighting) {
        let Some(storage) = &self.storage else {
            return;
        };

        let record = backup_record(chat, key, sighting);
        match storage.insert_sighting(&record).await {
            Ok(true) => debug!(chat_id = %chat, "sighting backed up"),
            Ok(false) => debug!(chat_id = %chat, "sighting already in backup"),
            Err(e) => warn!(chat_id = %chat, error = %e, "failed to persist sighting"),
        }
    }

    async fn prune(&self, now: DateTime<FixedOffset>) {
        let Some(storage) = &self.storage else {
            return;
        };

        match self.detector.retention().prune_durable(storage.as_ref(), now).await {
            Ok(0) => {}
            Ok(pruned) => info!(pruned, "pruned expired sightings from backup"),
            Err(e) => warn!(error = %e, "failed to prune backup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dupwatch_core::Sender;
    use dupwatch_core::types::SightingRecord;
    use dupwatch_test_utils::{ManualClock, MockChannel, MockStorage, inbound_text};

    const GROUP: i64 = -1001234567890;

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 2, 22, 10, 1, 2)
            .unwrap()
    }

    struct Harness {
        dedup: DedupLoop,
        channel: MockChannel,
        storage: Arc<MockStorage>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let channel = MockChannel::new();
        let storage = Arc::new(MockStorage::new());
        let clock = Arc::new(ManualClock::new(start()));
        let dedup = DedupLoop::new(
            Box::new(channel.clone()),
            Some(storage.clone() as Arc<dyn StorageAdapter + Send + Sync>),
            &DedupConfig::default(),
            clock.clone(),
        );
        Harness {
            dedup,
            channel,
            storage,
            clock,
        }
    }

    fn alice() -> Sender {
        Sender::new(1, "Alice")
    }

    fn bob() -> Sender {
        Sender::new(2, "Bob")
    }

    #[tokio::test]
    async fn first_message_is_backed_up_without_reply() {
        let mut h = harness();
        let outcome = h
            .dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::First { .. }));
        assert_eq!(h.channel.sent_count().await, 0);
        assert_eq!(h.storage.records().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_replies_in_thread() {
        let mut h = harness();
        h.dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        h.clock.advance_secs(10);

        let trigger = inbound_text(GROUP, bob(), "hello world ");
        let trigger_id = trigger.id.clone();
        h.dedup.handle_inbound(trigger).await.unwrap();

        let sent = h.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, ChatId(GROUP));
        assert_eq!(sent[0].reply_to, Some(trigger_id));
        assert!(sent[0].content.contains("Alice : Pengirim pertama kali"));
        assert!(sent[0].content.contains("Bob : Pengirim saat ini"));
        assert!(sent[0].content.ends_with("Total : 2 kali"));
        assert_eq!(h.storage.records().await.len(), 2);
    }

    #[tokio::test]
    async fn suppressed_repeat_is_not_sent_or_backed_up() {
        let mut h = harness();
        h.dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Test"))
            .await
            .unwrap();
        h.clock.advance_secs(5);

        let outcome = h
            .dedup
            .handle_inbound(inbound_text(GROUP, alice(), "test"))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Suppressed);
        assert_eq!(h.channel.sent_count().await, 0);
        assert_eq!(h.storage.records().await.len(), 1);
    }

    #[tokio::test]
    async fn backup_failure_does_not_block_detection() {
        let mut h = harness();
        h.storage.fail_next_operations(true);

        h.dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        h.clock.advance_secs(10);
        h.dedup
            .handle_inbound(inbound_text(GROUP, bob(), "Hello World"))
            .await
            .unwrap();

        assert_eq!(h.channel.sent_count().await, 1);
        assert!(h.storage.records().await.is_empty());
    }

    #[tokio::test]
    async fn send_failure_is_reported_but_history_kept() {
        let mut h = harness();
        h.dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        h.channel.fail_sends(true);
        h.clock.advance_secs(10);

        let result = h
            .dedup
            .handle_inbound(inbound_text(GROUP, bob(), "Hello World"))
            .await;
        assert!(result.is_err());

        let key = dupwatch_dedup::normalize_for_match("Hello World");
        let history = h.dedup.detector().history(ChatId(GROUP), &key).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_prunes_expired_backup_records() {
        let mut h = harness();
        let stale = SightingRecord {
            id: None,
            chat_id: ChatId(GROUP),
            text_hash: "old".into(),
            raw_text: "lama sekali".into(),
            sender_id: 9,
            sender_name: "Lama".into(),
            seen_at: start() - chrono::TimeDelta::days(31),
        };
        h.storage.seed(vec![stale]).await;

        h.dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        h.clock.advance_secs(10);
        h.dedup
            .handle_inbound(inbound_text(GROUP, bob(), "Hello World"))
            .await
            .unwrap();

        let records = h.storage.records().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.text_hash != "old"));
    }

    #[tokio::test]
    async fn rehydrate_restores_histories_from_backup() {
        let mut first = harness();
        first
            .dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        let backup = first.storage.records().await;

        let mut h = harness();
        h.storage.seed(backup).await;
        assert_eq!(h.dedup.rehydrate().await.unwrap(), 1);

        h.clock.advance_secs(10);
        let outcome = h
            .dedup
            .handle_inbound(inbound_text(GROUP, bob(), "HELLO WORLD"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Duplicate { history_len: 2, .. }));
    }

    #[tokio::test]
    async fn rehydrate_error_is_returned() {
        let mut h = harness();
        h.storage.fail_next_operations(true);
        assert!(h.dedup.rehydrate().await.is_err());
    }

    #[tokio::test]
    async fn works_without_backup() {
        let channel = MockChannel::new();
        let mut dedup = DedupLoop::new(
            Box::new(channel.clone()),
            None,
            &DedupConfig::default(),
            Arc::new(ManualClock::new(start())),
        );

        assert_eq!(dedup.rehydrate().await.unwrap(), 0);
        dedup
            .handle_inbound(inbound_text(GROUP, alice(), "Hello World"))
            .await
            .unwrap();
        dedup
            .handle_inbound(inbound_text(GROUP, bob(), "Hello World"))
            .await
            .unwrap();
        assert_eq!(channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn run_processes_until_channel_closes() {
        let mut h = harness();
        h.channel
            .inject_message(inbound_text(GROUP, alice(), "Hello World"))
            .await;
        h.channel
            .inject_message(inbound_text(GROUP, bob(), "ok"))
            .await;
        h.channel
            .inject_message(inbound_text(GROUP, bob(), "hello world"))
            .await;
        h.channel.close();

        h.dedup.run(CancellationToken::new()).await.unwrap();

        assert_eq!(h.channel.sent_count().await, 1);
        assert!(h.storage.is_closed());
    }

    #[tokio::test]
    async fn run_continues_after_failed_message() {
        let mut h = harness();
        h.channel.fail_sends(true);
        h.channel
            .inject_message(inbound_text(GROUP, alice(), "pesan pertama"))
            .await;
        h.channel
            .inject_message(inbound_text(GROUP, bob(), "pesan pertama"))
            .await;
        h.channel
            .inject_message(inbound_text(GROUP, alice(), "pesan kedua"))
            .await;
        h.channel.close();

        h.dedup.run(CancellationToken::new()).await.unwrap();

        let key = dupwatch_dedup::normalize_for_match("pesan kedua");
        assert!(h.dedup.detector().history(ChatId(GROUP), &key).is_some());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let mut h = harness();
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(2), h.dedup.run(cancel))
            .await
            .expect("run did not stop")
            .unwrap();
    }
}
