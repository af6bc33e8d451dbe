//! Persistence gateway for silo configuration and readings.
//!
//! The analytics core only talks to storage through [`TelemetryStore`]. Two
//! implementations are provided: [`SqliteStore`] for on-disk use and
//! [`MemoryStore`] for tests and throwaway runs.

mod memory;
mod seed;
mod sqlite;

pub use memory::MemoryStore;
pub use seed::seed_demo_data;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::core::model::{
    Geometry, Reading, Sample, Silo, SiloId, Thresholds, DEFAULT_SERVICE_INTERVAL_DAYS,
};
use crate::error::Result;

/// Everything needed to create a silo row
#[derive(Debug, Clone, PartialEq)]
pub struct NewSilo {
    pub name: String,
    pub geometry: Geometry,
    pub thresholds: Thresholds,
    pub next_service_date: NaiveDate,
}

impl NewSilo {
    /// Default thresholds and a service date 180 days after `today`
    pub fn with_defaults<S: Into<String>>(name: S, geometry: Geometry, today: NaiveDate) -> Self {
        Self {
            name: name.into(),
            geometry,
            thresholds: Thresholds::default(),
            next_service_date: today + Duration::days(DEFAULT_SERVICE_INTERVAL_DAYS),
        }
    }
}

/// Storage operations the core depends on.
///
/// Implementations must clamp the level into [0, 100] and derive the distance
/// from the silo's current height when inserting. History is returned
/// newest-first; callers that need chronological order reverse it.
pub trait TelemetryStore: Send + Sync {
    fn create_silo(&self, silo: &NewSilo) -> Result<SiloId>;

    fn update_silo_geometry(&self, id: SiloId, name: &str, geometry: Geometry) -> Result<()>;

    fn update_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()>;

    fn list_silos(&self) -> Result<Vec<Silo>>;

    fn get_silo(&self, id: SiloId) -> Result<Option<Silo>>;

    /// Append a reading with an explicit timestamp
    fn insert_reading_at(
        &self,
        id: SiloId,
        sample: &Sample,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading>;

    /// Append a reading stamped with the current time
    fn insert_reading(&self, id: SiloId, sample: &Sample) -> Result<Reading> {
        self.insert_reading_at(id, sample, Utc::now())
    }

    fn latest_reading(&self, id: SiloId) -> Result<Option<Reading>>;

    /// Most recent readings, newest first. `None` returns the full history.
    fn history(&self, id: SiloId, limit: Option<usize>) -> Result<Vec<Reading>>;
}
