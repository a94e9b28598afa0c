// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention: the in-memory history cap and age-based pruning of the backup.
//!
//! The two limits are independent. The cap bounds what a report shows; the
//! backup keeps every recorded sighting until it is older than the retention
//! age, regardless of how many sightings the in-memory window still holds.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use dupwatch_core::{DupwatchError, StorageAdapter};
use tracing::debug;

use crate::history::History;

/// Default number of sightings kept per history.
pub const HISTORY_CAP: usize = 10;

/// Default age, in days, after which backup records are pruned.
pub const RETENTION_DAYS: u32 = 30;

/// Drop the oldest sightings until at most `cap` remain. Returns how many were dropped.
///
/// A cap of zero is treated as one: a history is never emptied.
pub fn trim_history(history: &mut History, cap: usize) -> usize {
    let mut dropped = 0;
    while history.len() > cap.max(1) && history.pop_oldest().is_some() {
        dropped += 1;
    }
    dropped
}

/// History cap plus backup age limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    history_cap: usize,
    max_age: TimeDelta,
}

impl RetentionPolicy {
    pub fn new(history_cap: usize, retention_days: u32) -> Self {
        Self {
            history_cap: history_cap.max(1),
            max_age: TimeDelta::try_days(i64::from(retention_days)).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Apply the history cap.
    pub fn trim_history(&self, history: &mut History) -> usize {
        trim_history(history, self.history_cap)
    }

    /// Records strictly older than this instant are eligible for pruning.
    pub fn cutoff(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        now.checked_sub_signed(self.max_age)
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset())
    }

    /// Delete backup records older than the retention age.
    pub async fn prune_durable(
        &self,
        storage: &dyn StorageAdapter,
        now: DateTime<FixedOffset>,
    ) -> Result<usize, DupwatchError> {
        let cutoff = self.cutoff(now);
        let pruned = storage.prune_sightings(cutoff).await?;
        debug!(pruned, cutoff = %cutoff, "pruned durable sightings");
        Ok(pruned)
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(HISTORY_CAP, RETENTION_DAYS)
    }
}
