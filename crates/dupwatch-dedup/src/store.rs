// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat mapping from message key to sighting history.
//!
//! Chats are partitioned: a key seen in one chat never matches the same key
//! in another. Entries are created lazily and live for the lifetime of the
//! store.

use std::collections::HashMap;

use dupwatch_core::ChatId;

use crate::history::{History, Sighting};
use crate::normalize::MessageKey;
use crate::retention;

/// Result of [`DedupStore::record_and_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No history existed; one was created holding the sighting.
    First,
    /// A history already exists. Nothing was modified.
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct DedupStore {
    chats: HashMap<ChatId, HashMap<MessageKey, History>>,
    history_cap: usize,
}

impl DedupStore {
    pub fn new(history_cap: usize) -> Self {
        Self {
            chats: HashMap::new(),
            history_cap: history_cap.max(1),
        }
    }

    /// Create the history for `(chat, key)` if absent, otherwise report a duplicate.
    pub fn record_and_check(
        &mut self,
        chat: ChatId,
        key: &MessageKey,
        sighting: &Sighting,
    ) -> CheckOutcome {
        let keys = self.chats.entry(chat).or_default();
        if keys.contains_key(key) {
            return CheckOutcome::Duplicate;
        }
        keys.insert(key.clone(), History::new(sighting.clone()));
        CheckOutcome::First
    }

    /// Append to an existing history and apply the cap.
    ///
    /// Returns `None` without modifying anything if `(chat, key)` has no history.
    pub fn append(
        &mut self,
        chat: ChatId,
        key: &MessageKey,
        sighting: Sighting,
    ) -> Option<&History> {
        let cap = self.history_cap;
        let history = self.chats.get_mut(&chat)?.get_mut(key)?;
        history.push(sighting);
        retention::trim_history(history, cap);
        Some(history)
    }

    /// Read-only view of the history for `(chat, key)`.
    pub fn get_history(&self, chat: ChatId, key: &MessageKey) -> Option<&History> {
        self.chats.get(&chat)?.get(key)
    }

    /// Create-or-append without any policy other than the cap. Used when
    /// replaying the durable backup.
    pub fn restore(&mut self, chat: ChatId, key: MessageKey, sighting: Sighting) {
        let cap = self.history_cap;
        let keys = self.chats.entry(chat).or_default();
        match keys.get_mut(&key) {
            Some(history) => {
                history.push(sighting);
                retention::trim_history(history, cap);
            }
            None => {
                keys.insert(key, History::new(sighting));
            }
        }
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    /// Number of distinct keys tracked in `chat`.
    pub fn key_count(&self, chat: ChatId) -> usize {
        self.chats.get(&chat).map_or(0, HashMap::len)
    }
}

impl Default for DedupStore {
    fn default() -> Self {
        Self::new(retention::HISTORY_CAP)
    }
}
