// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sighting insert, load, and prune operations.
//!
//! Timestamps are stored as unix seconds plus the offset east of UTC so the
//! chat-local wall-clock time can be rebuilt on load.

use chrono::{DateTime, FixedOffset, Utc};
use dupwatch_core::DupwatchError;
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{Database, map_tr_err};
use crate::models::{ChatId, SightingRecord};

/// Insert a sighting. Returns `false` if an identical (chat, hash, time) row exists.
pub async fn insert_sighting(db: &Database, record: &SightingRecord) -> Result<bool, DupwatchError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO sightings
                    (chat_id, text_hash, raw_text, sender_id, sender_name, seen_at, utc_offset)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.chat_id.0,
                    record.text_hash,
                    record.raw_text,
                    record.sender_id,
                    record.sender_name,
                    record.seen_at.timestamp(),
                    record.seen_at.offset().local_minus_utc(),
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// All sightings, oldest first.
pub async fn list_sightings(db: &Database) -> Result<Vec<SightingRecord>, DupwatchError> {
    db.connection()
        .call(|conn| -> Result<Vec<SightingRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, text_hash, raw_text, sender_id, sender_name, seen_at, utc_offset
                 FROM sightings
                 ORDER BY seen_at ASC, id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let seen_at = to_local_time(row.get(6)?, row.get(7)?)?;
                Ok(SightingRecord {
                    id: Some(row.get(0)?),
                    chat_id: ChatId(row.get(1)?),
                    text_hash: row.get(2)?,
                    raw_text: row.get(3)?,
                    sender_id: row.get(4)?,
                    sender_name: row.get(5)?,
                    seen_at,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete sightings strictly older than `cutoff`. Returns the number removed.
pub async fn prune_sightings(
    db: &Database,
    cutoff: DateTime<FixedOffset>,
) -> Result<usize, DupwatchError> {
    let cutoff = cutoff.timestamp();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM sightings WHERE seen_at < ?1", params![cutoff])
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored sightings.
pub async fn count_sightings(db: &Database) -> Result<i64, DupwatchError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM sightings", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}

fn to_local_time(secs: i64, offset_secs: i32) -> Result<DateTime<FixedOffset>, rusqlite::Error> {
    let utc = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Integer,
            format!("timestamp out of range: {secs}").into(),
        )
    })?;
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Integer,
            format!("utc offset out of range: {offset_secs}").into(),
        )
    })?;
    Ok(utc.with_timezone(&offset))
}
