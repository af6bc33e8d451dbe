//! Analytics queries exposed to the presentation layer.
//!
//! Every call re-reads its inputs from the store. Two calls may observe
//! different data if the simulator writes in between; there is no snapshot.

use std::sync::Arc;

use crate::core::alerts::{evaluate_alerts, AlertState};
use crate::core::depletion::{estimate_depletion, DepletionConfig, DepletionEstimate};
use crate::core::model::{Reading, Sample, Silo, SiloId};
use crate::core::store::TelemetryStore;
use crate::core::window::{TelemetryWindow, WindowBound};
use crate::error::{Result, SiloError};

#[derive(Clone)]
pub struct SiloAnalytics {
    store: Arc<dyn TelemetryStore>,
    depletion: DepletionConfig,
    trend_window: usize,
}

impl SiloAnalytics {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self {
            store,
            depletion: DepletionConfig::default(),
            trend_window: crate::core::window::DEFAULT_TREND_WINDOW,
        }
    }

    pub fn with_depletion_config(mut self, config: DepletionConfig) -> Self {
        self.depletion = config;
        self
    }

    pub fn with_trend_window(mut self, readings: usize) -> Self {
        self.trend_window = readings;
        self
    }

    pub fn trend_window(&self) -> usize {
        self.trend_window
    }

    pub fn store(&self) -> &Arc<dyn TelemetryStore> {
        &self.store
    }

    fn silo(&self, id: SiloId) -> Result<Silo> {
        self.store.get_silo(id)?.ok_or(SiloError::SiloNotFound(id))
    }

    /// Latest reading of a known silo
    pub fn latest_reading(&self, id: SiloId) -> Result<Option<Reading>> {
        self.silo(id)?;
        self.store.latest_reading(id)
    }

    /// Alert state for the latest reading, `None` when the silo has no history
    pub fn alert_state(&self, id: SiloId) -> Result<Option<AlertState>> {
        let silo = self.silo(id)?;
        let latest = self.store.latest_reading(id)?;
        Ok(latest.map(|reading| evaluate_alerts(&reading, &silo.thresholds)))
    }

    /// Depletion estimate over the trend window.
    ///
    /// The current level comes from a separate latest-reading query, so under
    /// concurrent writes it may be one tick newer than the window's last entry.
    pub fn depletion_estimate(&self, id: SiloId) -> Result<DepletionEstimate> {
        self.silo(id)?;
        let Some(latest) = self.store.latest_reading(id)? else {
            return Ok(DepletionEstimate::InsufficientData);
        };
        let window = TelemetryWindow::fetch(
            self.store.as_ref(),
            id,
            WindowBound::Recent(self.trend_window),
        )?;
        Ok(estimate_depletion(&window, latest.level_percent, &self.depletion))
    }

    /// Chronological readings of a known silo
    pub fn window(&self, id: SiloId, bound: WindowBound) -> Result<TelemetryWindow> {
        self.silo(id)?;
        TelemetryWindow::fetch(self.store.as_ref(), id, bound)
    }

    /// Manual reading entry; completes before any re-evaluation
    pub fn record_reading(&self, id: SiloId, sample: Sample) -> Result<Reading> {
        sample.validate()?;
        let reading = self.store.insert_reading(id, &sample)?;
        log::info!(
            "Recorded {} reading for silo {}: level={:.1}% temp={:.1}°C humidity={:.1}%",
            reading.source.as_str(),
            id,
            reading.level_percent,
            reading.temp_c,
            reading.humidity
        );
        Ok(reading)
    }
}
