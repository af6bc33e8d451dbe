//! Background monitoring: the simulator loop and the analytics poll loop.

mod runtime;
mod tasks;

pub use runtime::{MonitorOptions, MonitorRuntime, SimulatorOptions};
pub use tasks::{RefreshReason, Snapshot};
