// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dupwatch serve` command implementation.
//!
//! Wires the Telegram channel, the SQLite backup and the dedup loop
//! together, rehydrates history and runs until a shutdown signal.

use std::sync::Arc;

use dupwatch_agent::DedupLoop;
use dupwatch_agent::shutdown;
use dupwatch_config::DupwatchConfig;
use dupwatch_core::{
    ChannelAdapter, DupwatchError, HealthStatus, LocalClock, PluginAdapter, StorageAdapter,
};
use dupwatch_storage::SqliteStorage;
use dupwatch_telegram::TelegramChannel;
use tracing::{error, info, warn};

/// Runs the bot until SIGINT/SIGTERM or until the Telegram channel closes.
pub async fn run_serve(config: DupwatchConfig) -> Result<(), DupwatchError> {
    info!("starting dupwatch");

    // A missing token is fatal before anything else is opened.
    let mut channel = TelegramChannel::new(config.telegram.clone())?;

    log_health(&channel).await;

    let storage = open_backup(&config).await;

    let cancel = shutdown::install_signal_handler();

    channel.connect().await?;
    info!("telegram channel connected");

    let mut dedup = DedupLoop::new(
        Box::new(channel),
        storage,
        &config.dedup,
        Arc::new(LocalClock),
    );

    if let Err(e) = dedup.rehydrate().await {
        warn!(error = %e, "failed to rehydrate history, starting empty");
    }

    dedup.run(cancel).await?;

    info!("dupwatch stopped");
    Ok(())
}

/// Opens the SQLite backup. The bot keeps running without a backup when the
/// database cannot be opened.
pub(crate) async fn open_backup(
    config: &DupwatchConfig,
) -> Option<Arc<dyn StorageAdapter + Send + Sync>> {
    let storage = SqliteStorage::new(config.storage.clone());
    match storage.initialize().await {
        Ok(()) => {
            info!(path = %config.storage.database_path, "backup database opened");
            log_health(&storage).await;
            Some(Arc::new(storage))
        }
        Err(e) => {
            error!(
                path = %config.storage.database_path,
                error = %e,
                "failed to open backup database, continuing without backup"
            );
            None
        }
    }
}

/// Opens the backup and reports its health without keeping it open.
pub(crate) async fn backup_health(config: &DupwatchConfig) -> HealthStatus {
    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return HealthStatus::Unhealthy(e.to_string());
    }
    let status = storage
        .health_check()
        .await
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "failed to checkpoint backup after health check");
    }
    status
}

/// Logs an adapter's health. An unhealthy adapter is reported, not fatal.
async fn log_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter health check failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn serve_fails_without_bot_token() {
        let dir = tempdir().unwrap();
        let mut config = DupwatchConfig::default();
        config.telegram.bot_token = None;
        config.storage.database_path = dir.path().join("dw.db").to_string_lossy().into_owned();

        let err = run_serve(config).await.unwrap_err();
        assert!(matches!(err, DupwatchError::Config(_)));
        assert!(
            !dir.path().join("dw.db").exists(),
            "backup must not be opened when the token is missing"
        );
    }

    #[tokio::test]
    async fn open_backup_creates_database() {
        let dir = tempdir().unwrap();
        let mut config = DupwatchConfig::default();
        config.storage.database_path = dir
            .path()
            .join("nested")
            .join("dw.db")
            .to_string_lossy()
            .into_owned();

        let storage = open_backup(&config).await.expect("backup should open");
        assert!(storage.load_sightings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_backup_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let mut config = DupwatchConfig::default();
        config.storage.database_path = dir.path().to_string_lossy().into_owned();

        assert!(open_backup(&config).await.is_none());
    }

    #[tokio::test]
    async fn backup_health_reports_open_database() {
        let dir = tempdir().unwrap();
        let mut config = DupwatchConfig::default();
        config.storage.database_path = dir.path().join("dw.db").to_string_lossy().into_owned();

        assert_eq!(backup_health(&config).await, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn backup_health_reports_unopenable_database() {
        let dir = tempdir().unwrap();
        let mut config = DupwatchConfig::default();
        config.storage.database_path = dir.path().to_string_lossy().into_owned();

        assert!(matches!(
            backup_health(&config).await,
            HealthStatus::Unhealthy(_)
        ));
    }
}
