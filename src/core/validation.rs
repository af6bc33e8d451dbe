// Boundary validation for user supplied configuration and readings.
// Values are rejected, never coerced; the core assumes they were checked here.

use crate::core::model::{Geometry, Sample, Thresholds};
use crate::error::{Result, SiloError};

/// Maximum silo name length
const MAX_NAME_LENGTH: usize = 64;

/// Parse a numeric field typed by a user
///
/// Empty, non-numeric and non-finite input is a validation error naming the field.
pub fn parse_number(field: &str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SiloError::validation(field, "value is required"));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| SiloError::validation(field, format!("'{}' is not a number", trimmed)))?;

    ensure_finite(field, value)?;
    Ok(value)
}

fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SiloError::validation(field, "value must be a finite number"));
    }
    Ok(())
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(SiloError::validation(
            field,
            format!("must be greater than zero (got {})", value),
        ));
    }
    Ok(())
}

/// Name and geometry for registering or editing a silo
#[derive(Debug, Clone, PartialEq)]
pub struct SiloDraft {
    pub name: String,
    pub geometry: Geometry,
}

impl SiloDraft {
    pub fn new<S: Into<String>>(name: S, radius_m: f64, height_m: f64) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::new(radius_m, height_m),
        }
    }

    /// Validates the draft and returns it with a trimmed name
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(SiloError::validation("name", "name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(SiloError::validation(
                "name",
                format!("name is too long (max {} characters)", MAX_NAME_LENGTH),
            ));
        }
        if name.chars().any(char::is_control) {
            return Err(SiloError::validation("name", "name contains control characters"));
        }

        ensure_positive("radius", self.geometry.radius_m)?;
        ensure_positive("height", self.geometry.height_m)?;

        Ok(Self {
            name,
            geometry: self.geometry,
        })
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("moisture threshold", self.moisture_percent)?;
        ensure_finite("temperature threshold", self.temp_c)?;
        ensure_finite("level threshold", self.level_percent)?;
        Ok(())
    }
}

impl Sample {
    /// Level is clamped by the gateway, so only finiteness is checked here
    pub fn validate(&self) -> Result<()> {
        ensure_finite("level", self.level_percent)?;
        ensure_finite("temperature", self.temp_c)?;
        ensure_finite("humidity", self.humidity)?;
        Ok(())
    }
}
