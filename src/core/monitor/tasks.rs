//! Analytics poll task.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::core::analytics::SiloAnalytics;
use crate::core::model::SiloId;
use crate::core::report::SiloReport;

/// Why an out-of-cadence recompute was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    SiloEdited,
    ThresholdsUpdated,
    ManualReading,
    Requested,
}

pub type Snapshot = Option<Arc<SiloReport>>;

/// Task that recomputes the selected silo's report.
///
/// Runs on a fixed cadence, and immediately whenever the selection changes or
/// a refresh is requested after a user mutation.
pub(super) async fn analytics_task(
    analytics: SiloAnalytics,
    period: Duration,
    mut selection_rx: watch::Receiver<Option<SiloId>>,
    mut refresh_rx: mpsc::Receiver<RefreshReason>,
    snapshot_tx: watch::Sender<Snapshot>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::info!("Analytics task started ({}ms cadence)", period.as_millis());

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = selection_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                log::debug!("Silo selection changed");
            }
            Some(reason) = refresh_rx.recv() => {
                log::debug!("Refresh requested: {:?}", reason);
            }
            _ = shutdown.recv() => {
                log::info!("Analytics task shutting down");
                break;
            }
        }

        let selected = *selection_rx.borrow_and_update();
        publish_snapshot(&analytics, selected, &snapshot_tx);
    }
}

/// Build and publish one snapshot. A failed poll keeps the previous snapshot.
fn publish_snapshot(
    analytics: &SiloAnalytics,
    selected: Option<SiloId>,
    snapshot_tx: &watch::Sender<Snapshot>,
) {
    let Some(id) = selected else {
        snapshot_tx.send_replace(None);
        return;
    };

    match SiloReport::build(analytics, id) {
        Ok(report) => {
            log::trace!("Snapshot for silo {} published", id);
            snapshot_tx.send_replace(Some(Arc::new(report)));
        }
        Err(e) => {
            log::warn!("Analytics poll for silo {} skipped: {}", id, e);
        }
    }
}
