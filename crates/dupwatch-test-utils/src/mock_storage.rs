// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter for deterministic testing.
//!
//! Mirrors the SQLite backup's observable behavior: row IDs are assigned on
//! insert, `(chat_id, text_hash, seen_at)` is unique, and records load in
//! ascending timestamp order.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::Mutex;

use dupwatch_core::DupwatchError;
use dupwatch_core::traits::adapter::PluginAdapter;
use dupwatch_core::traits::storage::StorageAdapter;
use dupwatch_core::types::{AdapterType, HealthStatus, SightingRecord};

/// A mock sighting backup for testing.
pub struct MockStorage {
    records: Mutex<Vec<SightingRecord>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    closed: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            failing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Pre-populate the backup. Records without an ID get one assigned.
    pub async fn seed(&self, records: Vec<SightingRecord>) {
        let mut stored = self.records.lock().await;
        for mut record in records {
            if record.id.is_none() {
                record.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
            }
            stored.push(record);
        }
    }

    /// Snapshot of everything currently stored, in insertion order.
    pub async fn records(&self) -> Vec<SightingRecord> {
        self.records.lock().await.clone()
    }

    /// While set, every storage operation returns an error.
    pub fn fail_next_operations(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    /// Whether `close()` (or `shutdown()`) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), DupwatchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DupwatchError::Storage {
                source: "mock storage failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockStorage {
    fn name(&self) -> &str {
        "mock-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DupwatchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("failure injected".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DupwatchError> {
        self.close().await
    }
}

#[async_trait]
impl StorageAdapter for MockStorage {
    async fn initialize(&self) -> Result<(), DupwatchError> {
        self.check_failure()
    }

    async fn close(&self) -> Result<(), DupwatchError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_sighting(&self, record: &SightingRecord) -> Result<bool, DupwatchError> {
        self.check_failure()?;
        let mut stored = self.records.lock().await;
        let conflict = stored.iter().any(|r| {
            r.chat_id == record.chat_id
                && r.text_hash == record.text_hash
                && r.seen_at.timestamp() == record.seen_at.timestamp()
        });
        if conflict {
            return Ok(false);
        }
        let mut record = record.clone();
        record.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
        stored.push(record);
        Ok(true)
    }

    async fn load_sightings(&self) -> Result<Vec<SightingRecord>, DupwatchError> {
        self.check_failure()?;
        let mut records = self.records.lock().await.clone();
        records.sort_by_key(|r| (r.seen_at.timestamp(), r.id));
        Ok(records)
    }

    async fn prune_sightings(
        &self,
        cutoff: DateTime<FixedOffset>,
    ) -> Result<usize, DupwatchError> {
        self.check_failure()?;
        let mut stored = self.records.lock().await;
        let before = stored.len();
        stored.retain(|r| r.seen_at >= cutoff);
        Ok(before - stored.len())
    }
}
