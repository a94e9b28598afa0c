// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The detection pipeline: normalize, look up, suppress, append, report.

use chrono::{DateTime, FixedOffset};
use dupwatch_config::model::DedupConfig;
use dupwatch_core::{ChatId, Sender, SightingRecord};
use tracing::{debug, warn};

use crate::history::{History, Sighting};
use crate::normalize::{self, MessageKey};
use crate::report::build_report;
use crate::retention::RetentionPolicy;
use crate::store::{CheckOutcome, DedupStore};
use crate::suppression::SuppressionPolicy;

/// What happened to one observed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Too short to track. Nothing was recorded.
    Ignored,
    /// First time this key was seen in the chat.
    First { key: MessageKey, sighting: Sighting },
    /// Same sender repeating themselves inside the suppression window.
    Suppressed,
    /// Recorded as a duplicate; `report` is ready to send.
    Duplicate {
        key: MessageKey,
        sighting: Sighting,
        report: String,
        history_len: usize,
    },
}

impl Outcome {
    /// The sighting that was recorded, if any. This is what goes to the backup.
    pub fn recorded(&self) -> Option<(&MessageKey, &Sighting)> {
        match self {
            Outcome::First { key, sighting } | Outcome::Duplicate { key, sighting, .. } => {
                Some((key, sighting))
            }
            Outcome::Ignored | Outcome::Suppressed => None,
        }
    }
}

/// Owns the in-memory store and the policies applied to it.
#[derive(Debug, Clone)]
pub struct Detector {
    store: DedupStore,
    suppression: SuppressionPolicy,
    retention: RetentionPolicy,
    min_text_chars: usize,
}

impl Detector {
    pub fn new(config: &DedupConfig) -> Self {
        let retention = RetentionPolicy::new(config.history_cap, config.retention_days);
        Self {
            store: DedupStore::new(retention.history_cap()),
            suppression: SuppressionPolicy::new(config.suppress_window_secs),
            retention,
            min_text_chars: config.min_text_chars,
        }
    }

    /// Process one text message received at `now`.
    pub fn observe(
        &mut self,
        chat: ChatId,
        sender: Sender,
        raw_text: &str,
        now: DateTime<FixedOffset>,
    ) -> Outcome {
        if !normalize::is_trackable(raw_text, self.min_text_chars) {
            return Outcome::Ignored;
        }

        let key = normalize::normalize_for_match(raw_text);
        let sighting = Sighting::new(sender, now, normalize::normalize_for_store(raw_text));

        if self.store.record_and_check(chat, &key, &sighting) == CheckOutcome::First {
            debug!(chat_id = %chat, sender_id = sighting.sender.id, "first sighting");
            return Outcome::First { key, sighting };
        }

        let suppressed = self
            .store
            .get_history(chat, &key)
            .is_some_and(|history| self.suppression.should_suppress(history, &sighting));
        if suppressed {
            debug!(chat_id = %chat, sender_id = sighting.sender.id, "repeat suppressed");
            return Outcome::Suppressed;
        }

        let Some(history) = self.store.append(chat, &key, sighting.clone()) else {
            // record_and_check returned Duplicate, so the history exists.
            return Outcome::Ignored;
        };
        let report = build_report(raw_text, history);
        let history_len = history.len();
        debug!(chat_id = %chat, sender_id = sighting.sender.id, history_len, "duplicate detected");

        Outcome::Duplicate {
            key,
            sighting,
            report,
            history_len,
        }
    }

    /// Replay backup records into the store. Returns how many were applied.
    ///
    /// Records are applied in ascending `seen_at` order, with row ID breaking
    /// ties. Records whose stored hash does not match their text are skipped.
    pub fn rehydrate(&mut self, mut records: Vec<SightingRecord>) -> usize {
        records.sort_by_key(|r| (r.seen_at, r.id));

        let mut applied = 0;
        for record in records {
            let key = normalize::normalize_for_match(&record.raw_text);
            if key.digest() != record.text_hash {
                warn!(
                    chat_id = %record.chat_id,
                    id = ?record.id,
                    "backup record hash does not match its text, skipping"
                );
                continue;
            }
            let sighting = Sighting::new(
                Sender::new(record.sender_id, record.sender_name),
                record.seen_at,
                record.raw_text,
            );
            self.store.restore(record.chat_id, key, sighting);
            applied += 1;
        }
        applied
    }

    pub fn history(&self, chat: ChatId, key: &MessageKey) -> Option<&History> {
        self.store.get_history(chat, key)
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    pub fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    pub fn suppression(&self) -> &SuppressionPolicy {
        &self.suppression
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

/// Backup row for a recorded sighting.
pub fn backup_record(chat: ChatId, key: &MessageKey, sighting: &Sighting) -> SightingRecord {
    SightingRecord {
        id: None,
        chat_id: chat,
        text_hash: key.digest(),
        raw_text: sighting.text.clone(),
        sender_id: sighting.sender.id,
        sender_name: sighting.sender.display_name.clone(),
        seen_at: sighting.seen_at,
    }
}
