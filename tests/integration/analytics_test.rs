use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use silo_monitor::core::depletion::estimate_depletion;
use silo_monitor::core::model::{Geometry, ReadingSource, Sample, SiloId, Thresholds};
use silo_monitor::core::store::{NewSilo, SqliteStore, TelemetryStore};
use silo_monitor::core::{
    AlertKind, AlertStatus, DepletionConfig, DepletionEstimate, GrainCondition, SiloAnalytics,
    WindowBound,
};
use silo_monitor::SiloError;
use std::sync::Arc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
}

fn setup() -> (Arc<dyn TelemetryStore>, SiloAnalytics, SiloId) {
    let store: Arc<dyn TelemetryStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let id = store
        .create_silo(&NewSilo::with_defaults(
            "Silo 01 (Wheat)",
            Geometry::new(2.5, 8.0),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ))
        .unwrap();
    let analytics = SiloAnalytics::new(store.clone());
    (store, analytics, id)
}

fn insert_hourly(store: &dyn TelemetryStore, id: SiloId, levels: &[f64]) {
    for (i, level) in levels.iter().enumerate() {
        store
            .insert_reading_at(
                id,
                &Sample::manual(*level, 24.0, 12.0),
                t0() + Duration::hours(i as i64),
            )
            .unwrap();
    }
}

#[test]
fn test_inserted_levels_stay_in_range() {
    let (store, analytics, id) = setup();

    for level in [150.0, -20.0, 42.0] {
        let reading = analytics
            .record_reading(id, Sample::manual(level, 24.0, 12.0))
            .unwrap();
        assert!((0.0..=100.0).contains(&reading.level_percent));
        let expected_distance = 8.0 * (1.0 - reading.level_percent / 100.0);
        assert!((reading.distance_m - expected_distance).abs() < 1e-9);
    }

    // Out-of-range distances clamp the same way
    for distance in [12.0, -3.0] {
        let sample = Sample::from_distance(distance, 8.0, 24.0, 12.0, ReadingSource::Manual);
        let reading = store.insert_reading(id, &sample).unwrap();
        assert!((0.0..=100.0).contains(&reading.level_percent));
    }

    let window = analytics.window(id, WindowBound::All).unwrap();
    assert_eq!(window.len(), 5);
    assert!(window
        .levels()
        .iter()
        .all(|level| (0.0..=100.0).contains(level)));
}

#[test]
fn test_flat_window_is_stable() {
    let (store, analytics, id) = setup();
    insert_hourly(store.as_ref(), id, &[80.0; 6]);

    assert_eq!(
        analytics.depletion_estimate(id).unwrap(),
        DepletionEstimate::Stable
    );
}

#[test]
fn test_falling_window_forecast() {
    let (store, analytics, id) = setup();
    let levels: Vec<f64> = (0..=10).map(|h| 80.0 - 5.0 * h as f64).collect();
    insert_hourly(store.as_ref(), id, &levels);

    let DepletionEstimate::Depleting(forecast) = analytics.depletion_estimate(id).unwrap() else {
        panic!("expected a numeric forecast");
    };
    assert!((forecast.rate_per_hour - 5.0).abs() < 1e-9);
    assert!((forecast.hours_left - 6.0).abs() < 1e-9);
    assert!((forecast.days_left - 0.25).abs() < 1e-9);
}

#[test]
fn test_short_history_is_insufficient() {
    let (store, analytics, id) = setup();
    assert_eq!(
        analytics.depletion_estimate(id).unwrap(),
        DepletionEstimate::InsufficientData
    );

    insert_hourly(store.as_ref(), id, &[90.0, 70.0, 50.0, 30.0, 10.0]);
    assert_eq!(
        analytics.depletion_estimate(id).unwrap(),
        DepletionEstimate::InsufficientData
    );
}

#[test]
fn test_refill_never_yields_a_forecast() {
    let (store, analytics, id) = setup();
    insert_hourly(store.as_ref(), id, &[10.0, 9.0, 8.0, 7.0, 60.0, 95.0]);
    assert_eq!(
        analytics.depletion_estimate(id).unwrap(),
        DepletionEstimate::Stable
    );

    let (store, analytics, id) = setup();
    insert_hourly(store.as_ref(), id, &[12.0, 12.2, 12.1, 12.0, 12.3, 12.0]);
    assert_eq!(
        analytics.depletion_estimate(id).unwrap(),
        DepletionEstimate::StableLowLevel
    );
}

#[test]
fn test_current_level_is_read_separately_from_window() {
    let (store, analytics, id) = setup();
    let levels: Vec<f64> = (0..=10).map(|h| 80.0 - 5.0 * h as f64).collect();
    insert_hourly(store.as_ref(), id, &levels);

    // A write lands between the window query and the latest-reading query
    let window = analytics.window(id, WindowBound::trend()).unwrap();
    store
        .insert_reading_at(
            id,
            &Sample::manual(20.0, 24.0, 12.0),
            t0() + Duration::hours(11),
        )
        .unwrap();
    let latest = analytics.latest_reading(id).unwrap().unwrap();

    assert_eq!(window.newest().unwrap().level_percent, 30.0);
    assert_eq!(latest.level_percent, 20.0);

    let estimate = estimate_depletion(&window, latest.level_percent, &DepletionConfig::default());
    let days = estimate.days_left().unwrap();
    assert!((days - 4.0 / 24.0).abs() < 1e-9);
}

#[test]
fn test_window_is_chronological() {
    let (store, analytics, id) = setup();
    let offsets = [5, 1, 3, 3, 0, 4, 2];
    for (i, minutes) in offsets.iter().enumerate() {
        store
            .insert_reading_at(
                id,
                &Sample::manual(50.0 + i as f64, 24.0, 12.0),
                t0() + Duration::minutes(*minutes),
            )
            .unwrap();
    }

    for bound in [WindowBound::All, WindowBound::Recent(4), WindowBound::Latest] {
        let window = analytics.window(id, bound).unwrap();
        let readings = window.readings();
        for pair in readings.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
            if pair[0].timestamp == pair[1].timestamp {
                assert!(pair[0].id < pair[1].id);
            }
        }
    }

    let recent = analytics.window(id, WindowBound::Recent(4)).unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent.newest().unwrap().timestamp, t0() + Duration::minutes(5));
    assert_eq!(analytics.window(id, WindowBound::Latest).unwrap().len(), 1);
}

#[test]
fn test_empty_history_is_not_an_error() {
    let (_store, analytics, id) = setup();
    assert!(analytics.window(id, WindowBound::All).unwrap().is_empty());
    assert!(analytics.alert_state(id).unwrap().is_none());
    assert!(analytics.latest_reading(id).unwrap().is_none());
}

#[test]
fn test_spoilage_outranks_low_level() {
    let (_store, analytics, id) = setup();
    analytics
        .record_reading(id, Sample::manual(5.0, 45.0, 12.0))
        .unwrap();

    let state = analytics.alert_state(id).unwrap().unwrap();
    assert_eq!(state.status, AlertStatus::Alert);
    assert!(state.is_triggered(AlertKind::HighTemperature));
    assert!(state.is_triggered(AlertKind::LowLevel));
    assert!(!state.is_triggered(AlertKind::HighMoisture));
    assert_eq!(state.condition, GrainCondition::SpoilageRisk);
}

#[test]
fn test_threshold_update_seen_by_next_evaluation() {
    let (store, analytics, id) = setup();
    analytics
        .record_reading(id, Sample::manual(60.0, 35.0, 12.0))
        .unwrap();

    let before = analytics.alert_state(id).unwrap().unwrap();
    assert_eq!(before.status, AlertStatus::Normal);
    assert_eq!(before.condition, GrainCondition::Optimal);

    store
        .update_thresholds(
            id,
            Thresholds {
                moisture_percent: 14.0,
                temp_c: 30.0,
                level_percent: 70.0,
            },
        )
        .unwrap();

    let after = analytics.alert_state(id).unwrap().unwrap();
    assert!(after.is_triggered(AlertKind::HighTemperature));
    assert!(after.is_triggered(AlertKind::LowLevel));
    assert_eq!(after.condition, GrainCondition::SpoilageRisk);
}

#[test]
fn test_boundary_errors() {
    let (_store, analytics, id) = setup();

    let err = analytics
        .record_reading(id, Sample::manual(f64::NAN, 24.0, 12.0))
        .unwrap_err();
    assert!(err.is_validation());

    let missing = SiloId(id.0 + 100);
    assert!(matches!(
        analytics.alert_state(missing),
        Err(SiloError::SiloNotFound(_))
    ));
    assert!(matches!(
        analytics.record_reading(missing, Sample::manual(50.0, 24.0, 12.0)),
        Err(SiloError::SiloNotFound(_))
    ));
}
