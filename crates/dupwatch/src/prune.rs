// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dupwatch prune` command implementation.

use chrono::{DateTime, FixedOffset};
use dupwatch_config::DupwatchConfig;
use dupwatch_core::{Clock, DupwatchError, LocalClock, StorageAdapter};
use dupwatch_dedup::RetentionPolicy;
use dupwatch_storage::SqliteStorage;
use tracing::info;

/// Deletes backup records older than `days` (or `dedup.retention_days`).
/// Returns the number of records removed.
pub async fn run_prune(config: &DupwatchConfig, days: Option<u32>) -> Result<usize, DupwatchError> {
    prune_at(config, days, LocalClock.now()).await
}

async fn prune_at(
    config: &DupwatchConfig,
    days: Option<u32>,
    now: DateTime<FixedOffset>,
) -> Result<usize, DupwatchError> {
    let retention_days = days.unwrap_or(config.dedup.retention_days);
    if retention_days == 0 {
        return Err(DupwatchError::Config(
            "retention must be at least 1 day".into(),
        ));
    }
    let policy = RetentionPolicy::new(config.dedup.history_cap, retention_days);

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let pruned = policy.prune_durable(&storage, now).await?;
    storage.close().await?;

    info!(pruned, retention_days, "backup pruned");
    Ok(pruned)
}
