// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the durable sighting backup.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::DupwatchError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SightingRecord;

/// Adapter for the durable sighting backup.
///
/// The backup is advisory: it is written after the in-memory state has been
/// updated, read once at startup to rebuild that state, and pruned by age.
/// It is never consulted while matching messages.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), DupwatchError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), DupwatchError>;

    /// Stores one sighting.
    ///
    /// Returns `Ok(false)` when a record with the same chat, text hash and
    /// timestamp already exists; that conflict is not an error.
    async fn insert_sighting(&self, record: &SightingRecord) -> Result<bool, DupwatchError>;

    /// Returns every stored sighting in ascending timestamp order.
    async fn load_sightings(&self) -> Result<Vec<SightingRecord>, DupwatchError>;

    /// Deletes sightings older than `cutoff`. Returns the number removed.
    async fn prune_sightings(&self, cutoff: DateTime<FixedOffset>)
    -> Result<usize, DupwatchError>;
}
