// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::DupwatchError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Adapter for a messaging platform.
///
/// The dedup loop only needs two things from a platform: the next text
/// message event, and a way to post a reply into a chat.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), DupwatchError>;

    /// Sends a reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, DupwatchError>;

    /// Receives the next inbound message from the channel.
    ///
    /// Returns a [`DupwatchError::Channel`] whose message contains "closed"
    /// once no further messages can arrive.
    async fn receive(&self) -> Result<InboundMessage, DupwatchError>;
}
