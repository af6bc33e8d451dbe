//! Alert evaluation for silo readings.
//!
//! Compares the latest reading against the silo's thresholds and derives the
//! triggered alerts plus a qualitative grain condition.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::model::{Reading, Thresholds};

/// Which threshold was breached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    HighTemperature,
    HighMoisture,
    LowLevel,
}

/// An individual alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Normal,
    Alert,
}

/// Qualitative state of the stored grain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrainCondition {
    Optimal,
    OptimalRefillNeeded,
    SpoilageRisk,
}

impl GrainCondition {
    pub fn label(&self) -> &'static str {
        match self {
            GrainCondition::Optimal => "Optimal",
            GrainCondition::OptimalRefillNeeded => "Optimal (Refill Needed)",
            GrainCondition::SpoilageRisk => "Warning: Spoilage Risk",
        }
    }
}

impl fmt::Display for GrainCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Alert state derived from one reading and one set of thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub status: AlertStatus,
    pub alerts: Vec<Alert>,
    pub condition: GrainCondition,
}

impl AlertState {
    pub fn is_triggered(&self, kind: AlertKind) -> bool {
        self.alerts.iter().any(|a| a.kind == kind)
    }

    /// One line summary, e.g. `ALERT: HIGH TEMP (41.0°C), CRITICAL LOW LEVEL (8.0%)`
    pub fn summary(&self) -> String {
        match self.status {
            AlertStatus::Normal => "SYSTEM NORMAL".to_string(),
            AlertStatus::Alert => {
                let parts: Vec<&str> = self.alerts.iter().map(|a| a.message.as_str()).collect();
                format!("ALERT: {}", parts.join(", "))
            }
        }
    }
}

/// Evaluate a reading against thresholds.
///
/// Every rule is checked independently. Spoilage risk (temperature or
/// moisture) outranks a low level when choosing the grain condition.
pub fn evaluate_alerts(reading: &Reading, thresholds: &Thresholds) -> AlertState {
    let mut alerts = Vec::new();

    let temp_alert = reading.temp_c > thresholds.temp_c;
    let moisture_alert = reading.humidity > thresholds.moisture_percent;
    let level_alert = reading.level_percent < thresholds.level_percent;

    if temp_alert {
        alerts.push(Alert {
            kind: AlertKind::HighTemperature,
            message: format!("HIGH TEMP ({:.1}°C)", reading.temp_c),
            value: reading.temp_c,
            threshold: thresholds.temp_c,
        });
    }

    if moisture_alert {
        alerts.push(Alert {
            kind: AlertKind::HighMoisture,
            message: format!("HIGH MOISTURE ({:.1}%)", reading.humidity),
            value: reading.humidity,
            threshold: thresholds.moisture_percent,
        });
    }

    if level_alert {
        alerts.push(Alert {
            kind: AlertKind::LowLevel,
            message: format!("CRITICAL LOW LEVEL ({:.1}%)", reading.level_percent),
            value: reading.level_percent,
            threshold: thresholds.level_percent,
        });
    }

    let condition = if temp_alert || moisture_alert {
        GrainCondition::SpoilageRisk
    } else if level_alert {
        GrainCondition::OptimalRefillNeeded
    } else {
        GrainCondition::Optimal
    };

    let status = if alerts.is_empty() {
        AlertStatus::Normal
    } else {
        AlertStatus::Alert
    };

    AlertState {
        status,
        alerts,
        condition,
    }
}
