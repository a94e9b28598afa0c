// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for dupwatch.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level dupwatch configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DupwatchConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Durable backup settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Duplicate detection tunables.
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required to run `dupwatch serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Group chat IDs the bot watches. Empty means every group it is a member of.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

/// Durable backup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("dupwatch").join("dupwatch.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("dupwatch.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Duplicate detection tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// Messages shorter than this many characters (after trimming) are ignored.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Number of most recent sightings kept per message in memory and in reports.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// A repeat by the same sender within this many seconds of their own
    /// previous sighting is not reported.
    #[serde(default = "default_suppress_window_secs")]
    pub suppress_window_secs: u64,

    /// Backup records older than this many days are pruned.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            history_cap: default_history_cap(),
            suppress_window_secs: default_suppress_window_secs(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_min_text_chars() -> usize {
    3
}

fn default_history_cap() -> usize {
    10
}

fn default_suppress_window_secs() -> u64 {
    300
}

fn default_retention_days() -> u32 {
    30
}
