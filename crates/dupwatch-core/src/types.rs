// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the dedup pipeline.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a chat (group) on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message on the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The author of a message: numeric platform ID plus the name shown in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub display_name: String,
}

impl Sender {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// A text message event delivered by a channel adapter.
///
/// Carries no timestamp: the dedup loop stamps its own wall-clock time when
/// the event is processed.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform message ID, used to thread the reply.
    pub id: MessageId,
    /// Name of the channel adapter that produced the event.
    pub channel: String,
    pub chat_id: ChatId,
    pub sender: Sender,
    pub text: String,
}

/// A reply to be delivered through a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub content: String,
    /// Message to reply to, if the platform supports threading.
    pub reply_to: Option<MessageId>,
}

/// One sighting as written to, and read back from, the durable backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SightingRecord {
    /// Autoincrement row ID; `None` until the record has been stored.
    pub id: Option<i64>,
    pub chat_id: ChatId,
    /// SHA-256 hex digest of the normalized match key.
    pub text_hash: String,
    /// Text as typed by the sender, trimmed.
    pub raw_text: String,
    pub sender_id: i64,
    pub sender_name: String,
    /// Chat-local wall-clock time, second precision.
    pub seen_at: DateTime<FixedOffset>,
}
