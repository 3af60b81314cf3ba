//! autolearn - course auto-advance helper
//!
//! Command-line entry point. Inspects and edits the shared state the catalog
//! and detail pages coordinate through, and evaluates page snapshots offline.

mod cli;
mod cmd_eval;
mod cmd_state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use autolearn_config::{Config, ConfigLoader};
use autolearn_store::{FileStore, KeySpace, StateStore};

use crate::cli::{Cli, Commands};

/// Get the autolearn home directory (~/.autolearn).
fn autolearn_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".autolearn"))
        .unwrap_or_else(|| PathBuf::from(".autolearn"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.autolearn/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = autolearn_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("autolearn")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(&autolearn_dir().join("config.toml"))?,
    };
    Ok(config)
}

fn open_state(config: &Config, store: Option<&Path>) -> Result<StateStore, Box<dyn std::error::Error>> {
    let path = store
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.resolved_path());
    debug!("Using state file {}", path.display());

    let kv = FileStore::new(path)?;
    Ok(StateStore::new(
        Arc::new(kv),
        KeySpace::new(config.storage.prefix.clone()),
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let store = cli.store.as_deref();

    match cli.command {
        Commands::Status { json } => cmd_state::status(&open_state(&config, store)?, json),
        Commands::Reset => cmd_state::reset(&open_state(&config, store)?),
        Commands::AutoRun { state } => {
            cmd_state::auto_run(&open_state(&config, store)?, state.enabled())
        }
        Commands::Publish { course, review } => {
            cmd_state::publish(&open_state(&config, store)?, course, review)
        }
        Commands::Detect { snapshot } => cmd_eval::detect(&snapshot, &config).await,
        Commands::Classify { summary } => cmd_eval::classify(&summary, &config).await,
        Commands::Next { snapshot } => {
            cmd_eval::next(&open_state(&config, store)?, &snapshot, &config).await
        }
        Commands::ConfigCheck => cmd_eval::config_check(&config),
    }
}
