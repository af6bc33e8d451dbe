//! Tokio runtime hosting the simulator and analytics loops.
//!
//! The two loops share nothing but the store. User actions go through
//! [`MonitorRuntime`], complete synchronously, then trigger a recompute.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

use super::tasks::{analytics_task, RefreshReason, Snapshot};
use crate::core::analytics::SiloAnalytics;
use crate::core::config::Config;
use crate::core::depletion::DepletionConfig;
use crate::core::model::{Reading, Sample, SiloId, Thresholds};
use crate::core::registry::SiloRegistry;
use crate::core::simulator::{simulator_task, ReadingSimulator, SimulationParams};
use crate::core::store::TelemetryStore;
use crate::core::validation::SiloDraft;
use crate::core::window::DEFAULT_TREND_WINDOW;
use crate::error::{Result, SiloError};

/// Simulator settings for a monitor run
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    pub interval: Duration,
    pub params: SimulationParams,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    pub trend_window: usize,
    pub depletion: DepletionConfig,
    /// `None` disables simulation
    pub simulator: Option<SimulatorOptions>,
    pub initial_selection: Option<SiloId>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            trend_window: DEFAULT_TREND_WINDOW,
            depletion: DepletionConfig::default(),
            simulator: None,
            initial_selection: None,
        }
    }
}

impl MonitorOptions {
    pub fn from_config(config: &Config) -> Self {
        let simulator = config.simulation.enabled.then(|| SimulatorOptions {
            interval: Duration::from_secs(config.simulation.interval_secs),
            params: config.simulation.params,
            seed: config.simulation.seed,
        });

        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            trend_window: config.trend_window,
            depletion: config.depletion,
            simulator,
            initial_selection: None,
        }
    }
}

/// Background monitor for one selected silo
pub struct MonitorRuntime {
    /// Receiver for report snapshots of the selected silo
    pub snapshot_rx: watch::Receiver<Snapshot>,

    selection_tx: watch::Sender<Option<SiloId>>,

    refresh_tx: mpsc::Sender<RefreshReason>,

    registry: SiloRegistry,

    analytics: SiloAnalytics,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Handle to the runtime (for shutdown)
    _runtime_handle: tokio::runtime::Runtime,
}

impl MonitorRuntime {
    /// Create the runtime and spawn the analytics task (and the simulator when enabled)
    pub fn start(store: Arc<dyn TelemetryStore>, options: MonitorOptions) -> Result<Self> {
        if options.poll_interval.is_zero() {
            return Err(SiloError::config("poll interval must be greater than zero"));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("silo-worker")
            .build()
            .map_err(|e| SiloError::runtime(format!("failed to start worker threads: {}", e)))?;

        let analytics = SiloAnalytics::new(store.clone())
            .with_depletion_config(options.depletion)
            .with_trend_window(options.trend_window);
        let registry = SiloRegistry::new(store.clone());

        let (snapshot_tx, snapshot_rx) = watch::channel::<Snapshot>(None);
        let (selection_tx, selection_rx) = watch::channel(options.initial_selection);
        let (refresh_tx, refresh_rx) = mpsc::channel::<RefreshReason>(16);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        if let Some(sim) = options.simulator {
            if sim.interval.is_zero() {
                return Err(SiloError::config("simulation interval must be greater than zero"));
            }
            sim.params.validate()?;
            let simulator = ReadingSimulator::from_seed(sim.params, sim.seed);
            runtime.spawn(simulator_task(
                store.clone(),
                simulator,
                sim.interval,
                shutdown_tx.subscribe(),
            ));
        }

        runtime.spawn(analytics_task(
            analytics.clone(),
            options.poll_interval,
            selection_rx,
            refresh_rx,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        log::info!("Monitor runtime started");

        Ok(Self {
            snapshot_rx,
            selection_tx,
            refresh_tx,
            registry,
            analytics,
            shutdown_tx,
            _runtime_handle: runtime,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Most recently published snapshot
    pub fn latest_snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn selected(&self) -> Option<SiloId> {
        *self.selection_tx.borrow()
    }

    pub fn registry(&self) -> &SiloRegistry {
        &self.registry
    }

    /// Switch the monitored silo; the analytics task recomputes right away
    pub fn select_silo(&self, id: SiloId) -> Result<()> {
        self.registry.get(id)?;
        self.selection_tx.send_replace(Some(id));
        Ok(())
    }

    pub fn update_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()> {
        self.registry.set_thresholds(id, thresholds)?;
        self.request_refresh(RefreshReason::ThresholdsUpdated);
        Ok(())
    }

    pub fn edit_silo(&self, id: SiloId, draft: SiloDraft) -> Result<()> {
        self.registry.edit(id, draft)?;
        self.request_refresh(RefreshReason::SiloEdited);
        Ok(())
    }

    pub fn record_reading(&self, id: SiloId, sample: Sample) -> Result<Reading> {
        let reading = self.analytics.record_reading(id, sample)?;
        self.request_refresh(RefreshReason::ManualReading);
        Ok(reading)
    }

    /// Ask for an out-of-cadence recompute. Dropped when the queue is full.
    pub fn request_refresh(&self, reason: RefreshReason) {
        if let Err(e) = self.refresh_tx.try_send(reason) {
            log::debug!("Refresh request not queued: {}", e);
        }
    }

    /// Shutdown the runtime gracefully.
    pub fn shutdown(self) {
        log::info!("Shutting down monitor runtime");
        let _ = self.shutdown_tx.send(());
        // Runtime will shutdown when dropped
    }
}
