//! Telemetry window: the most recent N readings of a silo, oldest first.

use serde::Serialize;

use crate::core::model::{Reading, SiloId};
use crate::core::store::TelemetryStore;
use crate::error::Result;

/// Default size of the trend window used for charts and depletion
pub const DEFAULT_TREND_WINDOW: usize = 48;

/// How many readings a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    /// Only the newest reading
    Latest,
    /// The newest `n` readings
    Recent(usize),
    /// Full history, for exports
    All,
}

impl WindowBound {
    pub fn trend() -> Self {
        WindowBound::Recent(DEFAULT_TREND_WINDOW)
    }

    fn limit(self) -> Option<usize> {
        match self {
            WindowBound::Latest => Some(1),
            WindowBound::Recent(n) => Some(n),
            WindowBound::All => None,
        }
    }
}

/// Chronologically ordered readings. Recomputed per query, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetryWindow {
    readings: Vec<Reading>,
}

impl TelemetryWindow {
    /// Fetch a window from the store, reordering oldest first
    pub fn fetch(store: &dyn TelemetryStore, silo_id: SiloId, bound: WindowBound) -> Result<Self> {
        if bound == WindowBound::Recent(0) {
            return Ok(Self::default());
        }
        let readings = store.history(silo_id, bound.limit())?;
        Ok(Self::from_readings(readings))
    }

    /// Build a window from readings in any order.
    ///
    /// Equal timestamps keep insertion order, which the id reflects.
    pub fn from_readings(mut readings: Vec<Reading>) -> Self {
        readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn newest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Level series for charting
    pub fn levels(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.level_percent).collect()
    }

    /// Temperature series for charting
    pub fn temperatures(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.temp_c).collect()
    }
}
