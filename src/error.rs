use std::io;
use thiserror::Error;

use crate::core::model::SiloId;

/// Custom error type for the silo monitor
#[derive(Error, Debug)]
pub enum SiloError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Silo {0} not found")]
    SiloNotFound(SiloId),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the silo monitor
pub type Result<T> = std::result::Result<T, SiloError>;

impl SiloError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SiloError::Config(msg.into())
    }

    /// Create an input validation error for a named field
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, msg: S) -> Self {
        SiloError::Validation {
            field: field.into(),
            message: msg.into(),
        }
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        SiloError::Runtime(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SiloError::Other(msg.into())
    }

    /// True for errors caused by bad caller input rather than the backend
    pub fn is_validation(&self) -> bool {
        matches!(self, SiloError::Validation { .. })
    }
}
