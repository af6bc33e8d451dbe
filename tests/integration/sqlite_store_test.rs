use chrono::{Duration, Local, TimeZone, Utc};
use silo_monitor::core::model::{Geometry, ReadingSource, Sample, SiloId, Thresholds};
use silo_monitor::core::store::{
    seed_demo_data, MemoryStore, NewSilo, SqliteStore, TelemetryStore,
};
use silo_monitor::core::validation::SiloDraft;
use silo_monitor::core::{
    AlertStatus, DepletionEstimate, GrainCondition, SiloAnalytics, SiloRegistry, SiloReport,
};
use silo_monitor::SiloError;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("silos.sqlite3");
    let t0 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    let id = {
        let store = SqliteStore::open(&path).unwrap();
        let id = store
            .create_silo(&NewSilo::with_defaults(
                "Barley",
                Geometry::new(3.0, 10.0),
                t0.date_naive(),
            ))
            .unwrap();
        for i in 0..3 {
            store
                .insert_reading_at(
                    id,
                    &Sample::manual(90.0 - i as f64, 22.0, 11.5),
                    t0 + Duration::minutes(i),
                )
                .unwrap();
        }
        id
    };

    assert!(path.exists());

    let store = SqliteStore::open(&path).unwrap();
    let silo = store.get_silo(id).unwrap().unwrap();
    assert_eq!(silo.name, "Barley");
    assert_eq!(silo.thresholds, Thresholds::default());
    assert_eq!(silo.next_service_date, t0.date_naive() + Duration::days(180));

    let history = store.history(id, None).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].level_percent, 88.0);
    assert_eq!(history[0].timestamp, t0 + Duration::minutes(2));
    assert_eq!(history[2].source, ReadingSource::Manual);
}

#[test]
fn test_history_limit_and_latest() {
    let store = SqliteStore::open_in_memory().unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    let id = store
        .create_silo(&NewSilo::with_defaults(
            "Oats",
            Geometry::new(2.0, 6.0),
            t0.date_naive(),
        ))
        .unwrap();

    assert!(store.latest_reading(id).unwrap().is_none());
    assert!(store.history(id, Some(5)).unwrap().is_empty());

    for i in 0..10 {
        store
            .insert_reading_at(
                id,
                &Sample::manual(i as f64 * 10.0, 20.0, 10.0),
                t0 + Duration::hours(i),
            )
            .unwrap();
    }

    let recent = store.history(id, Some(3)).unwrap();
    let levels: Vec<f64> = recent.iter().map(|r| r.level_percent).collect();
    assert_eq!(levels, vec![90.0, 80.0, 70.0]);
    assert_eq!(store.latest_reading(id).unwrap().unwrap().level_percent, 90.0);
    assert_eq!(store.history(id, None).unwrap().len(), 10);
}

#[test]
fn test_distance_follows_current_height() {
    let store: Arc<dyn TelemetryStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let registry = SiloRegistry::new(store.clone());
    let id = registry.register(SiloDraft::new("Rye", 2.0, 10.0)).unwrap();

    let before = store
        .insert_reading(id, &Sample::manual(50.0, 20.0, 10.0))
        .unwrap();
    assert!((before.distance_m - 5.0).abs() < 1e-9);

    registry.edit(id, SiloDraft::new("Rye", 2.0, 8.0)).unwrap();
    let after = store
        .insert_reading(id, &Sample::manual(50.0, 20.0, 10.0))
        .unwrap();
    assert!((after.distance_m - 4.0).abs() < 1e-9);

    // Stored readings are never rewritten
    let history = store.history(id, None).unwrap();
    assert!(history.iter().any(|r| (r.distance_m - 5.0).abs() < 1e-9));
}

#[test]
fn test_registry_validation_and_missing_silos() {
    let store: Arc<dyn TelemetryStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let registry = SiloRegistry::new(store.clone());

    assert!(registry
        .register(SiloDraft::new("", 2.0, 8.0))
        .unwrap_err()
        .is_validation());
    assert!(registry
        .register(SiloDraft::new("Flat", 2.0, 0.0))
        .unwrap_err()
        .is_validation());
    assert!(registry.list().unwrap().is_empty());

    let missing = SiloId(404);
    assert!(matches!(
        registry.edit(missing, SiloDraft::new("Ghost", 1.0, 1.0)),
        Err(SiloError::SiloNotFound(_))
    ));
    assert!(matches!(
        registry.set_thresholds(missing, Thresholds::default()),
        Err(SiloError::SiloNotFound(_))
    ));
    assert!(matches!(
        store.insert_reading(missing, &Sample::manual(10.0, 20.0, 10.0)),
        Err(SiloError::SiloNotFound(_))
    ));

    let id = registry.register(SiloDraft::new("  Spelt  ", 1.5, 6.0)).unwrap();
    let silo = registry.get(id).unwrap();
    assert_eq!(silo.name, "Spelt");
    assert_eq!(
        silo.next_service_date,
        Local::now().date_naive() + Duration::days(180)
    );
}

#[test]
fn test_seeded_database_report() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn TelemetryStore> =
        Arc::new(SqliteStore::open(dir.path().join("seeded.sqlite3")).unwrap());

    assert_eq!(seed_demo_data(store.as_ref(), Utc::now()).unwrap(), 2);
    assert_eq!(seed_demo_data(store.as_ref(), Utc::now()).unwrap(), 0);

    let silos = store.list_silos().unwrap();
    assert_eq!(silos.len(), 2);
    assert_eq!(silos[0].name, "Silo 01 (Wheat)");

    let analytics = SiloAnalytics::new(store);
    let report = SiloReport::build(&analytics, silos[0].id).unwrap();

    let alerts = report.alerts.as_ref().unwrap();
    assert_eq!(alerts.status, AlertStatus::Normal);
    assert_eq!(alerts.condition, GrainCondition::Optimal);
    assert_eq!(report.depletion, DepletionEstimate::Stable);
    assert_eq!(report.trend.len(), 20);
    assert!(report.inventory.unwrap().mass_t > 0.0);
}

#[test]
fn test_unknown_source_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tampered.sqlite3");
    let t0 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();

    let store = SqliteStore::open(&path).unwrap();
    let id = store
        .create_silo(&NewSilo::with_defaults(
            "Rye",
            Geometry::new(2.0, 6.0),
            t0.date_naive(),
        ))
        .unwrap();
    store
        .insert_reading_at(id, &Sample::manual(60.0, 21.0, 12.0), t0)
        .unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute("UPDATE telemetry SET source = 'sensor-x'", []).unwrap();

    let err = store.latest_reading(id).unwrap_err();
    assert!(matches!(err, SiloError::Database(_)));
    assert!(store.history(id, None).is_err());
}

#[test]
fn test_sqlite_and_memory_stamp_alike() {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
    let stamped = t0 + Duration::nanoseconds(987_654_321);
    let sample = Sample::manual(42.0, 22.0, 12.5);

    let sqlite = SqliteStore::open_in_memory().unwrap();
    let memory = MemoryStore::new();
    let stores: [&dyn TelemetryStore; 2] = [&sqlite, &memory];
    let mut stored = Vec::new();
    for store in stores {
        let id = store
            .create_silo(&NewSilo::with_defaults(
                "Millet",
                Geometry::new(2.0, 6.0),
                t0.date_naive(),
            ))
            .unwrap();
        let inserted = store.insert_reading_at(id, &sample, stamped).unwrap();
        assert_eq!(store.latest_reading(id).unwrap().unwrap(), inserted);
        stored.push(inserted);
    }

    assert_eq!(stored[0].timestamp, stored[1].timestamp);
    assert_eq!(stored[0].timestamp, t0 + Duration::microseconds(987_654));
    assert_eq!(stored[0].distance_m, stored[1].distance_m);
}
