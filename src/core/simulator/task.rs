//! Simulator tick and its background task.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::model::ReadingSimulator;
use crate::core::model::{Reading, Silo};
use crate::core::store::TelemetryStore;
use crate::error::Result;

/// Outcome of one simulator tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub written: Vec<Reading>,
    pub failed: Vec<Silo>,
}

/// Write one synthetic reading per registered silo.
///
/// A failure for one silo is logged and does not stop the others. Only a
/// failure to list silos aborts the tick.
pub fn run_tick<R: Rng>(
    store: &dyn TelemetryStore,
    simulator: &mut ReadingSimulator<R>,
    now: DateTime<Utc>,
) -> Result<TickReport> {
    let silos = store.list_silos()?;
    let mut report = TickReport::default();

    for silo in silos {
        match simulate_silo(store, simulator, &silo, now) {
            Ok(reading) => report.written.push(reading),
            Err(e) => {
                log::warn!(
                    "Simulation failed for silo {} ('{}'), skipping this tick: {}",
                    silo.id,
                    silo.name,
                    e
                );
                report.failed.push(silo);
            }
        }
    }

    log::debug!(
        "Simulator tick: {} readings written, {} silos failed",
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}

fn simulate_silo<R: Rng>(
    store: &dyn TelemetryStore,
    simulator: &mut ReadingSimulator<R>,
    silo: &Silo,
    now: DateTime<Utc>,
) -> Result<Reading> {
    let previous = store.latest_reading(silo.id)?;
    let sample = simulator.next_sample(previous.as_ref().map(|r| r.level_percent));

    // Keep timestamps strictly increasing per silo even if the clock stalls
    let timestamp = match previous {
        Some(prev) if prev.timestamp >= now => prev.timestamp + ChronoDuration::milliseconds(1),
        _ => now,
    };

    store.insert_reading_at(silo.id, &sample, timestamp)
}

/// Task that writes simulated readings on a fixed cadence.
///
/// Runs until a shutdown signal arrives. Each tick is its own retry: errors
/// never carry over to the next one.
pub async fn simulator_task<R: Rng + Send>(
    store: Arc<dyn TelemetryStore>,
    mut simulator: ReadingSimulator<R>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::info!("Simulator task started ({}ms cadence)", period.as_millis());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Store access is synchronous, same as the rest of the core
                if let Err(e) = run_tick(store.as_ref(), &mut simulator, Utc::now()) {
                    log::error!("Simulator tick skipped, could not list silos: {}", e);
                }
            }
            _ = shutdown.recv() => {
                log::info!("Simulator task shutting down");
                break;
            }
        }
    }
}
