// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! dupwatch - reports repeated messages in Telegram groups.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod prune;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dupwatch_config::DupwatchConfig;
use dupwatch_core::HealthStatus;

/// dupwatch - reports repeated messages in Telegram groups.
#[derive(Parser, Debug)]
#[command(name = "dupwatch", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot (default).
    Serve,
    /// Delete backup records older than the retention age.
    Prune {
        /// Override `dedup.retention_days` (at least 1).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },
    /// Validate configuration, print the effective settings and check the backup.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => dupwatch_config::load_and_validate_path(path),
        None => dupwatch_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            dupwatch_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_tracing(&config.agent.log_level);
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Prune { days } => {
            init_tracing(&config.agent.log_level);
            match prune::run_prune(&config, days).await {
                Ok(pruned) => println!("pruned {pruned} backup record(s)"),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::CheckConfig => {
            print_config_summary(&config);
            match serve::backup_health(&config).await {
                HealthStatus::Healthy => println!("  backup                     = healthy"),
                HealthStatus::Unhealthy(reason) => {
                    println!("  backup                     = unhealthy ({reason})")
                }
            }
        }
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dupwatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn print_config_summary(config: &DupwatchConfig) {
    println!("config OK");
    println!("  agent.log_level            = {}", config.agent.log_level);
    println!(
        "  telegram.bot_token         = {}",
        config
            .telegram
            .bot_token
            .as_deref()
            .map_or_else(|| "(not set)".to_string(), mask_secret)
    );
    println!("  telegram.allowed_chats     = {:?}", config.telegram.allowed_chats);
    println!("  storage.database_path      = {}", config.storage.database_path);
    println!("  storage.wal_mode           = {}", config.storage.wal_mode);
    println!("  dedup.min_text_chars       = {}", config.dedup.min_text_chars);
    println!("  dedup.history_cap          = {}", config.dedup.history_cap);
    println!("  dedup.suppress_window_secs = {}", config.dedup.suppress_window_secs);
    println!("  dedup.retention_days       = {}", config.dedup.retention_days);
}

/// Masks a secret for display: first and last four characters only.
/// Short values are fully masked.
fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
