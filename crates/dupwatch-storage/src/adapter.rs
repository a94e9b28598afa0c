// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tokio::sync::OnceCell;
use tracing::debug;

use dupwatch_config::model::StorageConfig;
use dupwatch_core::types::SightingRecord;
use dupwatch_core::{AdapterType, DupwatchError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, DupwatchError> {
        self.db.get().ok_or_else(|| DupwatchError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Number of sightings currently stored.
    pub async fn count(&self) -> Result<i64, DupwatchError> {
        queries::sightings::count_sightings(self.db()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, DupwatchError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DupwatchError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), DupwatchError> {
        let db = Database::open_with_options(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db.set(db).map_err(|_| DupwatchError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), DupwatchError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn insert_sighting(&self, record: &SightingRecord) -> Result<bool, DupwatchError> {
        queries::sightings::insert_sighting(self.db()?, record).await
    }

    async fn load_sightings(&self) -> Result<Vec<SightingRecord>, DupwatchError> {
        queries::sightings::list_sightings(self.db()?).await
    }

    async fn prune_sightings(
        &self,
        cutoff: DateTime<FixedOffset>,
    ) -> Result<usize, DupwatchError> {
        queries::sightings::prune_sightings(self.db()?, cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use dupwatch_core::ChatId;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn record(seen_at: DateTime<FixedOffset>) -> SightingRecord {
        SightingRecord {
            id: None,
            chat_id: ChatId(-100),
            text_hash: "7509e5bda0c762d2bac7f90d758b5b2263fa01ccbc542ab5e3df163be08e6ca9".into(),
            raw_text: "Hello World".into(),
            sender_id: 1,
            sender_name: "Alice".into(),
            seen_at,
        }
    }

    fn at(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .timestamp_opt(1_771_729_262 + secs, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_fail_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        assert!(storage.insert_sighting(&record(at(0))).await.is_err());
        assert!(storage.load_sightings().await.is_err());
    }

    #[tokio::test]
    async fn sighting_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let now = at(0);
        assert!(storage.insert_sighting(&record(now - TimeDelta::days(40))).await.unwrap());
        assert!(storage.insert_sighting(&record(now)).await.unwrap());
        assert!(!storage.insert_sighting(&record(now)).await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 2);

        let pruned = storage.prune_sightings(now - TimeDelta::days(30)).await.unwrap();
        assert_eq!(pruned, 1);

        let loaded = storage.load_sightings().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].seen_at, now);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        let first = SqliteStorage::new(make_config(path));
        first.initialize().await.unwrap();
        first.insert_sighting(&record(at(0))).await.unwrap();
        first.shutdown().await.unwrap();
        drop(first);

        let second = SqliteStorage::new(make_config(path));
        second.initialize().await.unwrap();
        assert_eq!(second.load_sightings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn shutdown_without_initialize_is_ok() {
        let storage = SqliteStorage::new(make_config(":memory:"));
        storage.shutdown().await.unwrap();
    }
}
