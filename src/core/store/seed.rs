use chrono::{DateTime, Duration, Local, Utc};

use super::{NewSilo, TelemetryStore};
use crate::core::model::{Geometry, ReadingSource, Sample, Thresholds};
use crate::error::Result;

const SEED_READINGS: i64 = 20;
const SEED_SPACING_HOURS: i64 = 2;
const SEED_SERVICE_DAYS: i64 = 90;

struct DemoSilo {
    name: &'static str,
    geometry: Geometry,
    thresholds: Thresholds,
    level: f64,
}

fn demo_silos() -> [DemoSilo; 2] {
    [
        DemoSilo {
            name: "Silo 01 (Wheat)",
            geometry: Geometry::new(2.5, 8.0),
            thresholds: Thresholds {
                moisture_percent: 13.5,
                temp_c: 35.0,
                level_percent: 15.0,
            },
            level: 75.0,
        },
        DemoSilo {
            name: "Silo 02 (Corn)",
            geometry: Geometry::new(2.5, 8.0),
            thresholds: Thresholds {
                moisture_percent: 14.0,
                temp_c: 30.0,
                level_percent: 10.0,
            },
            level: 45.0,
        },
    ]
}

/// Populate an empty store with two demo silos and a flat reading history.
///
/// Returns the number of silos created; a store that already has silos is
/// left untouched.
pub fn seed_demo_data(store: &dyn TelemetryStore, now: DateTime<Utc>) -> Result<usize> {
    if !store.list_silos()?.is_empty() {
        log::debug!("Store already has silos, skipping demo seed");
        return Ok(0);
    }

    let today = now.with_timezone(&Local).date_naive();
    let demo = demo_silos();

    for silo in &demo {
        let id = store.create_silo(&NewSilo {
            name: silo.name.to_string(),
            geometry: silo.geometry,
            thresholds: silo.thresholds,
            next_service_date: today + Duration::days(SEED_SERVICE_DAYS),
        })?;

        let sample = Sample {
            level_percent: silo.level,
            temp_c: 24.5,
            humidity: 12.0,
            source: ReadingSource::Seed,
        };
        for i in 0..SEED_READINGS {
            let ts = now - Duration::hours(SEED_SPACING_HOURS * (SEED_READINGS - i));
            store.insert_reading_at(id, &sample, ts)?;
        }

        log::info!("Seeded demo silo '{}' ({})", silo.name, id);
    }

    Ok(demo.len())
}
