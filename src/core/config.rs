use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::depletion::DepletionConfig;
use crate::core::simulator::SimulationConfig;
use crate::core::window::DEFAULT_TREND_WINDOW;

const APP_DIR: &str = "silo-monitor";
const DATABASE_FILE: &str = "silo_system.sqlite3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file (defaults to the user data directory)
    pub database_path: Option<String>,
    pub simulation: SimulationConfig,
    /// Analytics refresh cadence while idle
    pub poll_interval_secs: u64,
    /// Readings used for trend and depletion
    pub trend_window: usize,
    pub depletion: DepletionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            simulation: SimulationConfig::default(),
            poll_interval_secs: 5,
            trend_window: DEFAULT_TREND_WINDOW,
            depletion: DepletionConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path. Missing, empty or unreadable content yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config = serde_json::from_str(&data).unwrap_or_else(|e| {
            // Format changes between versions should not lock users out
            log::warn!(
                "Ignoring unreadable config file {:?}, using defaults: {}",
                config_path,
                e
            );
            Config::default()
        });

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR).join("config.json"))
    }

    /// Configured database path, or the default under the user data directory
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(PathBuf::from(path));
        }

        let data_dir = dirs::data_dir().with_context(|| "Could not determine data directory")?;
        Ok(data_dir.join(APP_DIR).join(DATABASE_FILE))
    }

    pub fn set_database_path(&mut self, path: String) {
        self.database_path = Some(path);
    }

    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        self.simulation.enabled = enabled;
    }

    /// Reject settings the runtime cannot work with
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.poll_interval_secs > 0, "poll interval must be at least 1 second");
        anyhow::ensure!(
            self.simulation.interval_secs > 0,
            "simulation interval must be at least 1 second"
        );
        anyhow::ensure!(self.trend_window > 0, "trend window must hold at least one reading");
        self.simulation.params.validate()?;
        Ok(())
    }
}
