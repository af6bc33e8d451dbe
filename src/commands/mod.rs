// Command handlers module
pub mod completions;
pub mod config;
pub mod history;
pub mod init;
pub mod silo;
pub mod simulate;
pub mod status;
pub mod version;
pub mod watch;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ArgMatches;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::model::SiloId;
use crate::core::store::{seed_demo_data, MemoryStore, SqliteStore, TelemetryStore};
use crate::core::Config;

// Re-exports for cleaner imports
pub use version::execute as version;

/// Database path from the global `--db` flag, falling back to the config
pub fn resolve_database_path(matches: &ArgMatches, config: &Config) -> Result<PathBuf> {
    match matches.get_one::<String>("database") {
        Some(path) => Ok(PathBuf::from(path)),
        None => config.database_path(),
    }
}

/// True when the global `--ephemeral` flag was given
pub fn is_ephemeral(matches: &ArgMatches) -> bool {
    matches
        .try_get_one::<bool>("ephemeral")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

/// Throwaway in-memory store holding the demo silos. Nothing touches disk.
pub fn open_ephemeral_store() -> Result<Arc<dyn TelemetryStore>> {
    let store = MemoryStore::new();
    let seeded = seed_demo_data(&store, Utc::now())?;
    log::debug!("Using in-memory store with {} demo silos", seeded);
    Ok(Arc::new(store))
}

/// Open the store the command should work against
pub fn open_store(matches: &ArgMatches, config: &Config) -> Result<Arc<dyn TelemetryStore>> {
    if is_ephemeral(matches) {
        return open_ephemeral_store();
    }

    let path = resolve_database_path(matches, config)?;
    log::debug!("Opening database {:?}", path);

    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open database: {:?}", path))?;
    Ok(Arc::new(store))
}

/// The positional silo id argument
pub fn silo_id_arg(matches: &ArgMatches) -> Result<SiloId> {
    matches
        .get_one::<i64>("id")
        .copied()
        .map(SiloId)
        .context("Silo id argument is required")
}
