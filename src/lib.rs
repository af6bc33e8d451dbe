// Silo Monitor Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, SiloError};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;

// Initialize logging (info by default, RUST_LOG overrides)
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
