// Core domain logic: silo model, storage, analytics and background monitoring

pub mod alerts;
pub mod analytics;
pub mod config;
pub mod depletion;
pub mod model;
pub mod monitor;
pub mod registry;
pub mod report;
pub mod simulator;
pub mod store;
pub mod validation;
pub mod window;

// Re-export commonly used items
pub use alerts::{evaluate_alerts, Alert, AlertKind, AlertState, AlertStatus, GrainCondition};
pub use analytics::SiloAnalytics;
pub use config::Config;
pub use depletion::{estimate_depletion, DepletionConfig, DepletionEstimate, DepletionForecast};
pub use model::{Geometry, Inventory, Reading, ReadingSource, Sample, Silo, SiloId, Thresholds};
pub use monitor::{MonitorOptions, MonitorRuntime};
pub use registry::SiloRegistry;
pub use report::SiloReport;
pub use store::{MemoryStore, NewSilo, SqliteStore, TelemetryStore};
pub use validation::SiloDraft;
pub use window::{TelemetryWindow, WindowBound};
