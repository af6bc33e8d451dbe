use silo_monitor::core::depletion::DepletionConfig;
use silo_monitor::core::monitor::MonitorOptions;
use silo_monitor::core::simulator::UniformRange;
use silo_monitor::Config;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.database_path.is_none());
    assert!(!config.simulation.enabled);
    assert_eq!(config.poll_interval_secs, 5);
    assert_eq!(config.depletion, DepletionConfig::default());
}

#[test]
fn test_default_database_location() {
    let config = Config::default();
    if let Ok(path) = config.database_path() {
        assert!(path.ends_with("silo-monitor/silo_system.sqlite3"));
    }
}

#[test]
fn test_config_roundtrip_with_simulation_params() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.set_simulation_enabled(true);
    config.simulation.interval_secs = 2;
    config.simulation.params.consumption = UniformRange::new(0.02, 0.2);
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());

    let options = MonitorOptions::from_config(&loaded);
    let simulator = options.simulator.unwrap();
    assert_eq!(simulator.interval, Duration::from_secs(2));
    assert_eq!(simulator.params.consumption, UniformRange::new(0.02, 0.2));
}

#[test]
fn test_simulation_disabled_means_no_simulator() {
    let options = MonitorOptions::from_config(&Config::default());
    assert!(options.simulator.is_none());
    assert_eq!(options.poll_interval, Duration::from_secs(5));
    assert_eq!(options.trend_window, 48);
}

#[test]
fn test_invalid_ranges_rejected() {
    let mut config = Config::default();
    config.simulation.params.noise = UniformRange::new(1.0, -1.0);
    assert!(config.validate().is_err());

    let config = Config {
        trend_window: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = Config::load_from(&temp_dir.path().join("absent.json")).unwrap();
    assert_eq!(loaded, Config::default());
}
