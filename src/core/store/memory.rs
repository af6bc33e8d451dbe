use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::RwLock;

use super::{NewSilo, TelemetryStore};
use crate::core::model::{
    clamp_level, distance_from_level, Geometry, Reading, Sample, Silo, SiloId, Thresholds,
};
use crate::error::{Result, SiloError};

#[derive(Debug, Default)]
struct Inner {
    silos: Vec<Silo>,
    readings: Vec<Reading>,
    next_silo_id: i64,
    next_reading_id: i64,
}

/// In-process store with the same semantics as the SQLite gateway
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading_count(&self) -> usize {
        self.inner.read().readings.len()
    }
}

impl Inner {
    fn silo_mut(&mut self, id: SiloId) -> Result<&mut Silo> {
        self.silos
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SiloError::SiloNotFound(id))
    }

    /// Newest first, matching `ORDER BY timestamp DESC, id DESC`
    fn sorted_history(&self, id: SiloId) -> Vec<Reading> {
        let mut rows: Vec<Reading> = self
            .readings
            .iter()
            .filter(|r| r.silo_id == id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        rows
    }
}

impl TelemetryStore for MemoryStore {
    fn create_silo(&self, silo: &NewSilo) -> Result<SiloId> {
        let mut inner = self.inner.write();
        inner.next_silo_id += 1;
        let id = SiloId(inner.next_silo_id);
        inner.silos.push(Silo {
            id,
            name: silo.name.clone(),
            geometry: silo.geometry,
            thresholds: silo.thresholds,
            next_service_date: silo.next_service_date,
        });
        Ok(id)
    }

    fn update_silo_geometry(&self, id: SiloId, name: &str, geometry: Geometry) -> Result<()> {
        let mut inner = self.inner.write();
        let silo = inner.silo_mut(id)?;
        silo.name = name.to_string();
        silo.geometry = geometry;
        Ok(())
    }

    fn update_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()> {
        let mut inner = self.inner.write();
        inner.silo_mut(id)?.thresholds = thresholds;
        Ok(())
    }

    fn list_silos(&self) -> Result<Vec<Silo>> {
        Ok(self.inner.read().silos.clone())
    }

    fn get_silo(&self, id: SiloId) -> Result<Option<Silo>> {
        Ok(self.inner.read().silos.iter().find(|s| s.id == id).cloned())
    }

    fn insert_reading_at(
        &self,
        id: SiloId,
        sample: &Sample,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading> {
        let mut inner = self.inner.write();
        let height = inner.silo_mut(id)?.geometry.height_m;
        let level = clamp_level(sample.level_percent);

        inner.next_reading_id += 1;
        let reading = Reading {
            id: inner.next_reading_id,
            silo_id: id,
            timestamp: timestamp.trunc_subsecs(6),
            distance_m: distance_from_level(level, height),
            level_percent: level,
            temp_c: sample.temp_c,
            humidity: sample.humidity,
            source: sample.source,
        };
        inner.readings.push(reading.clone());
        Ok(reading)
    }

    fn latest_reading(&self, id: SiloId) -> Result<Option<Reading>> {
        Ok(self.inner.read().sorted_history(id).into_iter().next())
    }

    fn history(&self, id: SiloId, limit: Option<usize>) -> Result<Vec<Reading>> {
        let mut rows = self.inner.read().sorted_history(id);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
