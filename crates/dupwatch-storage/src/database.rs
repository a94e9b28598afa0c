// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! `Database` wraps the one connection; query functions take `&Database` and
//! go through [`Database::connection`]. Do NOT create additional Connection
//! instances for writes.

use std::path::Path;

use dupwatch_core::DupwatchError;
use tracing::debug;

use crate::migrations;

/// Handle to the sighting backup database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, DupwatchError> {
        Self::open_with_options(path, true).await
    }

    /// Open with an explicit journal mode choice.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, DupwatchError> {
        if path != ":memory:"
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DupwatchError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| DupwatchError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = {journal};
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;"
            ))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(migrations::run_migrations)
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => map_tr_err(other),
            })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The single serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), DupwatchError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into DupwatchError::Storage.
pub(crate) fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> DupwatchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    DupwatchError::Storage {
        source: Box::new(e),
    }
}
