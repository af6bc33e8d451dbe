//! Depletion estimate: time until a silo reaches 0% fill.
//!
//! The rate is taken from the net level drop between the oldest and newest
//! readings of a trend window. The remaining time is projected from the level
//! of the latest reading, which callers fetch separately from the window.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::window::TelemetryWindow;

/// Tunables for the depletion estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepletionConfig {
    /// Readings required before any estimate is attempted
    pub min_readings: usize,
    /// Net drop (percentage points) below which the trend counts as flat
    pub min_drop_percent: f64,
    /// Window span (hours) below which the trend counts as flat
    pub min_elapsed_hours: f64,
    /// A flat trend under this level is reported as `StableLowLevel`
    pub low_level_percent: f64,
}

impl Default for DepletionConfig {
    fn default() -> Self {
        Self {
            min_readings: 6,
            min_drop_percent: 0.5,
            min_elapsed_hours: 0.05,
            low_level_percent: 20.0,
        }
    }
}

/// Projected depletion for a falling level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepletionForecast {
    pub rate_per_hour: f64,
    pub hours_left: f64,
    pub days_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum DepletionEstimate {
    Depleting(DepletionForecast),
    Stable,
    StableLowLevel,
    InsufficientData,
}

impl DepletionEstimate {
    pub fn days_left(&self) -> Option<f64> {
        match self {
            DepletionEstimate::Depleting(forecast) => Some(forecast.days_left),
            _ => None,
        }
    }
}

impl fmt::Display for DepletionEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepletionEstimate::Depleting(forecast) => write!(f, "{:.1} Days", forecast.days_left),
            DepletionEstimate::Stable => f.write_str("Stable"),
            DepletionEstimate::StableLowLevel => f.write_str("Stable (Low Level)"),
            DepletionEstimate::InsufficientData => f.write_str("Calculating..."),
        }
    }
}

/// Estimate days until empty from a chronological window and the current level
pub fn estimate_depletion(
    window: &TelemetryWindow,
    current_level: f64,
    config: &DepletionConfig,
) -> DepletionEstimate {
    if window.len() < config.min_readings.max(1) {
        return DepletionEstimate::InsufficientData;
    }

    let (Some(start), Some(end)) = (window.oldest(), window.newest()) else {
        return DepletionEstimate::InsufficientData;
    };

    let drop = start.level_percent - end.level_percent;
    let elapsed_hours = (end.timestamp - start.timestamp).num_milliseconds() as f64 / 3_600_000.0;

    if drop > config.min_drop_percent && elapsed_hours > config.min_elapsed_hours {
        let rate_per_hour = drop / elapsed_hours;
        let hours_left = current_level / rate_per_hour;
        return DepletionEstimate::Depleting(DepletionForecast {
            rate_per_hour,
            hours_left,
            days_left: hours_left / 24.0,
        });
    }

    if current_level < config.low_level_percent {
        DepletionEstimate::StableLowLevel
    } else {
        DepletionEstimate::Stable
    }
}
