// Silo registry: create, read and update silo configuration

use chrono::Local;
use std::sync::Arc;

use crate::core::model::{Silo, SiloId, Thresholds};
use crate::core::store::{NewSilo, TelemetryStore};
use crate::core::validation::SiloDraft;
use crate::error::{Result, SiloError};

/// Registry for silo configuration backed by a telemetry store
#[derive(Clone)]
pub struct SiloRegistry {
    store: Arc<dyn TelemetryStore>,
}

impl SiloRegistry {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self { store }
    }

    /// Register a new silo with default thresholds
    ///
    /// Returns the identity assigned by the store
    pub fn register(&self, draft: SiloDraft) -> Result<SiloId> {
        let draft = draft.validate()?;
        let today = Local::now().date_naive();
        let id = self
            .store
            .create_silo(&NewSilo::with_defaults(draft.name.clone(), draft.geometry, today))?;

        log::info!("Registered silo '{}' as {}", draft.name, id);
        Ok(id)
    }

    /// Change the name and geometry of an existing silo
    pub fn edit(&self, id: SiloId, draft: SiloDraft) -> Result<()> {
        let draft = draft.validate()?;
        self.store
            .update_silo_geometry(id, &draft.name, draft.geometry)?;
        log::info!(
            "Updated silo {}: name='{}' radius={}m height={}m",
            id,
            draft.name,
            draft.geometry.radius_m,
            draft.geometry.height_m
        );
        Ok(())
    }

    pub fn set_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()> {
        thresholds.validate()?;
        self.store.update_thresholds(id, thresholds)?;
        log::info!(
            "Updated thresholds for silo {}: moisture={}% temp={}°C level={}%",
            id,
            thresholds.moisture_percent,
            thresholds.temp_c,
            thresholds.level_percent
        );
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Silo>> {
        self.store.list_silos()
    }

    /// Fetch a silo, failing with `SiloNotFound` when it does not exist
    pub fn get(&self, id: SiloId) -> Result<Silo> {
        self.store
            .get_silo(id)?
            .ok_or(SiloError::SiloNotFound(id))
    }
}
