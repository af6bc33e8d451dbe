use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;

use super::{NewSilo, TelemetryStore};
use crate::core::model::{
    clamp_level, distance_from_level, Geometry, Reading, ReadingSource, Sample, Silo, SiloId,
    Thresholds,
};
use crate::error::{Result, SiloError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS silos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    radius_m REAL NOT NULL,
    height_m REAL NOT NULL,
    threshold_moisture REAL NOT NULL,
    threshold_temp REAL NOT NULL,
    threshold_level_percent REAL NOT NULL,
    next_service_date TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS telemetry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    silo_id INTEGER NOT NULL REFERENCES silos(id),
    timestamp TEXT NOT NULL,
    distance_m REAL NOT NULL,
    level_percent REAL NOT NULL,
    temp_c REAL NOT NULL,
    humidity REAL NOT NULL,
    source TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_telemetry_silo_time ON telemetry(silo_id, timestamp);
";

const SILO_COLUMNS: &str = "id, name, radius_m, height_m, threshold_moisture, threshold_temp, \
     threshold_level_percent, next_service_date";

const READING_COLUMNS: &str =
    "id, silo_id, timestamp, distance_m, level_percent, temp_c, humidity, source";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite backed persistence gateway
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        log::debug!("Opening telemetry database at {:?}", path);
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

// Timestamps are stored as fixed-width RFC 3339 so text order equals time order
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn silo_from_row(row: &Row<'_>) -> rusqlite::Result<Silo> {
    let service: String = row.get(7)?;
    let next_service_date =
        NaiveDate::parse_from_str(&service, DATE_FORMAT).map_err(|e| conversion_error(7, e))?;

    Ok(Silo {
        id: SiloId(row.get(0)?),
        name: row.get(1)?,
        geometry: Geometry::new(row.get(2)?, row.get(3)?),
        thresholds: Thresholds {
            moisture_percent: row.get(4)?,
            temp_c: row.get(5)?,
            level_percent: row.get(6)?,
        },
        next_service_date,
    })
}

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<Reading> {
    let ts: String = row.get(2)?;
    let timestamp = DateTime::parse_from_rfc3339(&ts)
        .map_err(|e| conversion_error(2, e))?
        .with_timezone(&Utc);
    let source: String = row.get(7)?;
    let source = ReadingSource::parse(&source).ok_or_else(|| {
        conversion_error(
            7,
            SiloError::validation("reading source", format!("unknown source '{}'", source)),
        )
    })?;

    Ok(Reading {
        id: row.get(0)?,
        silo_id: SiloId(row.get(1)?),
        timestamp,
        distance_m: row.get(3)?,
        level_percent: row.get(4)?,
        temp_c: row.get(5)?,
        humidity: row.get(6)?,
        source,
    })
}

impl TelemetryStore for SqliteStore {
    fn create_silo(&self, silo: &NewSilo) -> Result<SiloId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO silos (name, radius_m, height_m, threshold_moisture, threshold_temp, \
             threshold_level_percent, next_service_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                silo.name,
                silo.geometry.radius_m,
                silo.geometry.height_m,
                silo.thresholds.moisture_percent,
                silo.thresholds.temp_c,
                silo.thresholds.level_percent,
                silo.next_service_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(SiloId(conn.last_insert_rowid()))
    }

    fn update_silo_geometry(&self, id: SiloId, name: &str, geometry: Geometry) -> Result<()> {
        let changed = self.conn.lock().execute(
            "UPDATE silos SET name = ?1, radius_m = ?2, height_m = ?3 WHERE id = ?4",
            params![name, geometry.radius_m, geometry.height_m, id.0],
        )?;
        if changed == 0 {
            return Err(SiloError::SiloNotFound(id));
        }
        Ok(())
    }

    fn update_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()> {
        let changed = self.conn.lock().execute(
            "UPDATE silos SET threshold_moisture = ?1, threshold_temp = ?2, \
             threshold_level_percent = ?3 WHERE id = ?4",
            params![
                thresholds.moisture_percent,
                thresholds.temp_c,
                thresholds.level_percent,
                id.0
            ],
        )?;
        if changed == 0 {
            return Err(SiloError::SiloNotFound(id));
        }
        Ok(())
    }

    fn list_silos(&self) -> Result<Vec<Silo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM silos ORDER BY id", SILO_COLUMNS))?;
        let silos = stmt
            .query_map([], silo_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(silos)
    }

    fn get_silo(&self, id: SiloId) -> Result<Option<Silo>> {
        let conn = self.conn.lock();
        let silo = conn
            .query_row(
                &format!("SELECT {} FROM silos WHERE id = ?1", SILO_COLUMNS),
                params![id.0],
                silo_from_row,
            )
            .optional()?;
        Ok(silo)
    }

    fn insert_reading_at(
        &self,
        id: SiloId,
        sample: &Sample,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading> {
        let conn = self.conn.lock();
        let height: f64 = conn
            .query_row(
                "SELECT height_m FROM silos WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(SiloError::SiloNotFound(id))?;

        let timestamp = timestamp.trunc_subsecs(6);
        let level = clamp_level(sample.level_percent);
        let distance = distance_from_level(level, height);

        conn.execute(
            "INSERT INTO telemetry (silo_id, timestamp, distance_m, level_percent, temp_c, \
             humidity, source) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.0,
                encode_timestamp(&timestamp),
                distance,
                level,
                sample.temp_c,
                sample.humidity,
                sample.source.as_str(),
            ],
        )?;

        Ok(Reading {
            id: conn.last_insert_rowid(),
            silo_id: id,
            timestamp,
            distance_m: distance,
            level_percent: level,
            temp_c: sample.temp_c,
            humidity: sample.humidity,
            source: sample.source,
        })
    }

    fn latest_reading(&self, id: SiloId) -> Result<Option<Reading>> {
        Ok(self.history(id, Some(1))?.into_iter().next())
    }

    fn history(&self, id: SiloId, limit: Option<usize>) -> Result<Vec<Reading>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM telemetry WHERE silo_id = ?1 \
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
            READING_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![id.0, limit], reading_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
