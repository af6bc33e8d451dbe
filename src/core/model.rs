//! Silo and reading data model.
//!
//! Silos are owned by the registry and only change through explicit edits.
//! Readings are immutable facts appended to a silo's history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Bulk density used for the mass estimate (wheat, t/m³)
pub const GRAIN_DENSITY_T_PER_M3: f64 = 0.78;

/// Days between silo registration and its first scheduled service
pub const DEFAULT_SERVICE_INTERVAL_DAYS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiloId(pub i64);

impl fmt::Display for SiloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cylindrical silo geometry in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub radius_m: f64,
    pub height_m: f64,
}

impl Geometry {
    pub fn new(radius_m: f64, height_m: f64) -> Self {
        Self { radius_m, height_m }
    }

    /// Total volume of the cylinder (m³)
    pub fn capacity_m3(&self) -> f64 {
        PI * self.radius_m.powi(2) * self.height_m
    }

    /// Stored volume at the given fill level (m³)
    pub fn volume_at(&self, level_percent: f64) -> f64 {
        self.capacity_m3() * (clamp_level(level_percent) / 100.0)
    }
}

/// Alert thresholds for a single silo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Humidity ceiling (%)
    pub moisture_percent: f64,
    /// Temperature ceiling (°C)
    pub temp_c: f64,
    /// Fill level floor (%)
    pub level_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            moisture_percent: 14.0,
            temp_c: 40.0,
            level_percent: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Silo {
    pub id: SiloId,
    pub name: String,
    pub geometry: Geometry,
    pub thresholds: Thresholds,
    pub next_service_date: NaiveDate,
}

/// Where a reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingSource {
    Seed,
    Manual,
    Simulated,
}

impl ReadingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingSource::Seed => "seed",
            ReadingSource::Manual => "manual",
            ReadingSource::Simulated => "simulated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "seed" => Some(ReadingSource::Seed),
            "manual" => Some(ReadingSource::Manual),
            "simulated" => Some(ReadingSource::Simulated),
            _ => None,
        }
    }
}

/// A persisted sensor observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Insertion order within the store, used to break timestamp ties
    pub id: i64,
    pub silo_id: SiloId,
    pub timestamp: DateTime<Utc>,
    pub distance_m: f64,
    pub level_percent: f64,
    pub temp_c: f64,
    pub humidity: f64,
    pub source: ReadingSource,
}

/// Measurement values before the gateway stamps and stores them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub level_percent: f64,
    pub temp_c: f64,
    pub humidity: f64,
    pub source: ReadingSource,
}

impl Sample {
    pub fn manual(level_percent: f64, temp_c: f64, humidity: f64) -> Self {
        Self {
            level_percent,
            temp_c,
            humidity,
            source: ReadingSource::Manual,
        }
    }

    /// Build a sample from a raw distance-to-grain measurement
    pub fn from_distance(
        distance_m: f64,
        height_m: f64,
        temp_c: f64,
        humidity: f64,
        source: ReadingSource,
    ) -> Self {
        Self {
            level_percent: level_from_distance(distance_m, height_m),
            temp_c,
            humidity,
            source,
        }
    }
}

/// Clamp a fill level into [0, 100]. NaN collapses to 0.
pub fn clamp_level(level_percent: f64) -> f64 {
    if level_percent.is_nan() {
        return 0.0;
    }
    level_percent.clamp(0.0, 100.0)
}

/// `level = 100 * (1 - distance / height)`, clamped
pub fn level_from_distance(distance_m: f64, height_m: f64) -> f64 {
    if height_m <= 0.0 {
        return 0.0;
    }
    clamp_level(100.0 * (1.0 - distance_m / height_m))
}

/// Inverse of [`level_from_distance`] for an in-range level
pub fn distance_from_level(level_percent: f64, height_m: f64) -> f64 {
    height_m * (1.0 - clamp_level(level_percent) / 100.0)
}

/// Stored grain for a silo at a given level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub volume_m3: f64,
    pub mass_t: f64,
}

impl Inventory {
    pub fn at_level(geometry: &Geometry, level_percent: f64) -> Self {
        let volume_m3 = geometry.volume_at(level_percent);
        Self {
            volume_m3,
            mass_t: volume_m3 * GRAIN_DENSITY_T_PER_M3,
        }
    }
}
