//! View model combining configuration, latest reading and analytics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::alerts::AlertState;
use crate::core::analytics::SiloAnalytics;
use crate::core::depletion::DepletionEstimate;
use crate::core::model::{Inventory, Reading, Silo, SiloId};
use crate::core::window::{TelemetryWindow, WindowBound};
use crate::error::{Result, SiloError};

/// Everything the presentation layer shows for one silo
#[derive(Debug, Clone, Serialize)]
pub struct SiloReport {
    pub generated_at: DateTime<Utc>,
    pub silo: Silo,
    pub latest: Option<Reading>,
    pub inventory: Option<Inventory>,
    pub alerts: Option<AlertState>,
    pub depletion: DepletionEstimate,
    pub trend: TelemetryWindow,
}

impl SiloReport {
    /// Compose a report; each analytics query fetches its own inputs
    pub fn build(analytics: &SiloAnalytics, id: SiloId) -> Result<Self> {
        let silo = analytics
            .store()
            .get_silo(id)?
            .ok_or(SiloError::SiloNotFound(id))?;

        let latest = analytics.latest_reading(id)?;
        let inventory = latest
            .as_ref()
            .map(|r| Inventory::at_level(&silo.geometry, r.level_percent));
        let alerts = analytics.alert_state(id)?;
        let depletion = analytics.depletion_estimate(id)?;
        let trend = analytics.window(id, WindowBound::Recent(analytics.trend_window()))?;

        Ok(Self {
            generated_at: Utc::now(),
            silo,
            latest,
            inventory,
            alerts,
            depletion,
            trend,
        })
    }

    pub fn has_alerts(&self) -> bool {
        self.alerts.as_ref().is_some_and(|a| !a.alerts.is_empty())
    }
}
