// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::DupwatchConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
///
/// The bot token is deliberately not checked here: commands such as `prune`
/// run without it. `serve` rejects a missing token when it builds the
/// Telegram adapter.
pub fn validate_config(config: &DupwatchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level `{}` is not one of: {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.dedup.min_text_chars == 0 {
        errors.push(ConfigError::Validation {
            message: "dedup.min_text_chars must be at least 1".to_string(),
        });
    }

    if config.dedup.history_cap == 0 {
        errors.push(ConfigError::Validation {
            message: "dedup.history_cap must be at least 1".to_string(),
        });
    }

    if config.dedup.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "dedup.retention_days must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
