use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use silo_monitor::core::model::{Geometry, Reading, Sample, Silo, SiloId, Thresholds};
use silo_monitor::core::simulator::{run_tick, ReadingSimulator, SimulationParams};
use silo_monitor::core::store::{MemoryStore, NewSilo, TelemetryStore};
use silo_monitor::core::{TelemetryWindow, WindowBound};
use silo_monitor::{Result, SiloError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
}

fn add_silo(store: &dyn TelemetryStore, name: &str) -> SiloId {
    store
        .create_silo(&NewSilo::with_defaults(
            name,
            Geometry::new(2.5, 8.0),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ))
        .unwrap()
}

/// Store that refuses writes for one silo
struct FlakyStore {
    inner: MemoryStore,
    broken: SiloId,
}

impl TelemetryStore for FlakyStore {
    fn create_silo(&self, silo: &NewSilo) -> Result<SiloId> {
        self.inner.create_silo(silo)
    }

    fn update_silo_geometry(&self, id: SiloId, name: &str, geometry: Geometry) -> Result<()> {
        self.inner.update_silo_geometry(id, name, geometry)
    }

    fn update_thresholds(&self, id: SiloId, thresholds: Thresholds) -> Result<()> {
        self.inner.update_thresholds(id, thresholds)
    }

    fn list_silos(&self) -> Result<Vec<Silo>> {
        self.inner.list_silos()
    }

    fn get_silo(&self, id: SiloId) -> Result<Option<Silo>> {
        self.inner.get_silo(id)
    }

    fn insert_reading_at(
        &self,
        id: SiloId,
        sample: &Sample,
        timestamp: DateTime<Utc>,
    ) -> Result<Reading> {
        if id == self.broken {
            return Err(SiloError::other("disk full"));
        }
        self.inner.insert_reading_at(id, sample, timestamp)
    }

    fn latest_reading(&self, id: SiloId) -> Result<Option<Reading>> {
        self.inner.latest_reading(id)
    }

    fn history(&self, id: SiloId, limit: Option<usize>) -> Result<Vec<Reading>> {
        self.inner.history(id, limit)
    }
}

#[test]
fn test_failure_for_one_silo_does_not_stop_the_tick() {
    let inner = MemoryStore::new();
    let first = add_silo(&inner, "First");
    let broken = add_silo(&inner, "Broken");
    let last = add_silo(&inner, "Last");
    let store = FlakyStore { inner, broken };

    let mut simulator = ReadingSimulator::from_seed(SimulationParams::default(), Some(3));

    for tick in 0..3 {
        let report = run_tick(&store, &mut simulator, t0() + Duration::seconds(5 * tick)).unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, broken);
    }

    assert_eq!(store.history(first, None).unwrap().len(), 3);
    assert_eq!(store.history(last, None).unwrap().len(), 3);
    assert!(store.history(broken, None).unwrap().is_empty());
}

#[test]
fn test_simulated_level_trends_down() {
    let store = MemoryStore::new();
    let id = add_silo(&store, "Wheat");
    let mut simulator = ReadingSimulator::from_seed(SimulationParams::default(), Some(42));

    for tick in 0..500 {
        run_tick(&store, &mut simulator, t0() + Duration::seconds(5 * tick)).unwrap();
    }

    let window = TelemetryWindow::fetch(&store, id, WindowBound::All).unwrap();
    let levels = window.levels();
    assert_eq!(levels.len(), 500);

    let (early, late) = levels.split_at(250);
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    assert!(mean(late) < mean(early));

    // Expected consumption is 0.08 points per tick from a start of 50
    let last = *levels.last().unwrap();
    assert!(last < 20.0, "level only fell to {}", last);
}

#[test]
fn test_simulated_readings_stay_in_range() {
    let store = MemoryStore::new();
    let id = add_silo(&store, "Nearly empty");
    store
        .insert_reading_at(id, &Sample::manual(0.1, 24.0, 12.0), t0())
        .unwrap();

    let mut simulator = ReadingSimulator::from_seed(SimulationParams::default(), Some(7));
    for tick in 1..=50 {
        run_tick(&store, &mut simulator, t0() + Duration::seconds(5 * tick)).unwrap();
    }

    for reading in store.history(id, None).unwrap() {
        assert!((0.0..=100.0).contains(&reading.level_percent));
        assert!((23.0..=29.0).contains(&reading.temp_c));
        assert!((11.0..=15.0).contains(&reading.humidity));
    }
    // Consumption outweighs the noise, so the level hugs the floor
    assert!(store.latest_reading(id).unwrap().unwrap().level_percent < 1.0);
}

#[test]
fn test_timestamps_increase_when_clock_stalls() {
    let store = MemoryStore::new();
    let id = add_silo(&store, "Corn");
    let mut simulator = ReadingSimulator::from_seed(SimulationParams::default(), Some(1));

    for _ in 0..4 {
        run_tick(&store, &mut simulator, t0()).unwrap();
    }

    let window = TelemetryWindow::fetch(&store, id, WindowBound::All).unwrap();
    let readings = window.readings();
    assert_eq!(readings.len(), 4);
    for pair in readings.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
}

#[test]
fn test_same_seed_same_readings() {
    let run = || {
        let store = MemoryStore::new();
        let id = add_silo(&store, "Seeded");
        let mut simulator = ReadingSimulator::from_seed(SimulationParams::default(), Some(99));
        for tick in 0..10 {
            run_tick(&store, &mut simulator, t0() + Duration::seconds(5 * tick)).unwrap();
        }
        TelemetryWindow::fetch(&store, id, WindowBound::All)
            .unwrap()
            .levels()
    };

    assert_eq!(run(), run());
}
