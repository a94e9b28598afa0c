// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dupwatch.toml` > `~/.config/dupwatch/dupwatch.toml` > `/etc/dupwatch/dupwatch.toml`
//! with environment variable overrides via `DUPWATCH_` prefix and the bare `BOT_TOKEN` variable.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DupwatchConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dupwatch/dupwatch.toml` (system-wide)
/// 3. `~/.config/dupwatch/dupwatch.toml` (user XDG config)
/// 4. `./dupwatch.toml` (local directory)
/// 5. `BOT_TOKEN` environment variable
/// 6. `DUPWATCH_*` environment variables
pub fn load_config() -> Result<DupwatchConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DupwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DupwatchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DupwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DupwatchConfig::default()))
        .merge(Toml::file(path))
        .merge(bot_token_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DupwatchConfig::default()))
        .merge(Toml::file("/etc/dupwatch/dupwatch.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dupwatch/dupwatch.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dupwatch.toml"))
        .merge(bot_token_provider())
        .merge(env_provider())
}

/// `BOT_TOKEN` is the variable existing deployments already export.
fn bot_token_provider() -> Env {
    Env::raw()
        .only(&["BOT_TOKEN"])
        .map(|_| "telegram.bot_token".into())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `DUPWATCH_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("DUPWATCH_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DUPWATCH_DEDUP_HISTORY_CAP -> "dedup_history_cap"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("dedup_", "dedup.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_mapping_keeps_underscored_key_names() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DUPWATCH_TELEGRAM_BOT_TOKEN", "123:from-env");
            jail.set_env("DUPWATCH_DEDUP_SUPPRESS_WINDOW_SECS", "60");
            let config: DupwatchConfig = Figment::new()
                .merge(Serialized::defaults(DupwatchConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("123:from-env"));
            assert_eq!(config.dedup.suppress_window_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn bare_bot_token_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BOT_TOKEN", "123:legacy");
            let config: DupwatchConfig = Figment::new()
                .merge(Serialized::defaults(DupwatchConfig::default()))
                .merge(bot_token_provider())
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("123:legacy"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_token_wins_over_bare_token() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BOT_TOKEN", "123:legacy");
            jail.set_env("DUPWATCH_TELEGRAM_BOT_TOKEN", "456:prefixed");
            let config: DupwatchConfig = Figment::new()
                .merge(Serialized::defaults(DupwatchConfig::default()))
                .merge(bot_token_provider())
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("456:prefixed"));
            Ok(())
        });
    }

    #[test]
    fn config_file_path_is_honored() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[storage]
database_path = "/var/lib/dupwatch/backup.db"
"#,
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.storage.database_path, "/var/lib/dupwatch/backup.db");
            Ok(())
        });
    }
}
