// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for dupwatch, a group-chat duplicate message notifier.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the rest of the workspace. Channel and storage adapters
//! implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DupwatchError;
pub use types::{
    AdapterType, ChatId, HealthStatus, InboundMessage, MessageId, OutboundMessage, Sender,
    SightingRecord,
};

pub use traits::{ChannelAdapter, Clock, LocalClock, PluginAdapter, StorageAdapter};
