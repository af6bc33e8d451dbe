//! Reading simulator for installations without a physical sensor feed.
//!
//! Each tick continues every silo's level with a stochastic consumption
//! model and writes the result through the telemetry store.

mod model;
mod task;

use serde::{Deserialize, Serialize};

pub use model::{ReadingSimulator, SimulationParams, UniformRange};
pub use task::{run_tick, simulator_task, TickReport};

/// Simulation mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    pub params: SimulationParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 5,
            seed: None,
            params: SimulationParams::default(),
        }
    }
}
