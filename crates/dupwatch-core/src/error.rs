// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for dupwatch.

use thiserror::Error;

/// The primary error type used across adapter traits and the dedup loop.
#[derive(Debug, Error)]
pub enum DupwatchError {
    /// Configuration errors (missing bot token, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The inbound side of a channel is gone; no further events will arrive.
    #[error("channel closed: {channel}")]
    ChannelClosed { channel: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DupwatchError {
    /// Returns true when the error means the inbound side of a channel is gone
    /// and no further events will arrive.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, DupwatchError::ChannelClosed { .. })
    }
}
