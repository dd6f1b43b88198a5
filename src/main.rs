//! Binary entry point that glues the persisted shelf to the TUI: read the
//! configuration, start file logging, open storage, hydrate the shelf and
//! drive the Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use bookshelf_manager::{
    run_app, App, Bookshelf, Config, KeyValueStore, MemoryStore, PersistenceBridge, ShelfHandle,
    SqliteStore,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config)?;

    let storage = open_storage(&config)?;
    let bridge = PersistenceBridge::with_key(storage, config.storage.key.clone());
    let shelf: ShelfHandle = Bookshelf::open(bridge)
        .context("failed to load the stored bookshelf")?
        .with_revert_delay(config.revert_delay());

    let mut app = App::new(shelf, &config);
    run_app(&mut app)
}

/// The terminal belongs to the UI, so log lines go to a file.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();
    Ok(())
}

/// SQLite when it can be opened; otherwise an in-memory store that reports
/// itself as non-durable so the shelf warns the user once.
fn open_storage(config: &Config) -> Result<Box<dyn KeyValueStore>> {
    let db_path = config.db_path()?;
    match SqliteStore::open(&db_path) {
        Ok(store) => {
            info!(path = %db_path.display(), "opened bookshelf database");
            Ok(Box::new(store))
        }
        Err(err) => {
            warn!(error = %err, path = %db_path.display(), "falling back to session-only storage");
            Ok(Box::new(MemoryStore::unavailable()))
        }
    }
}
