//! Silo registry commands: list, add, edit, thresholds and manual readings.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::commands::{open_store, silo_id_arg};
use crate::core::model::{ReadingSource, Sample, Silo, Thresholds};
use crate::core::validation::{parse_number, SiloDraft};
use crate::core::{Config, SiloAnalytics, SiloRegistry};
use crate::ui::{self, SiloRow};

pub fn list(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(matches, &config)?;
    let registry = SiloRegistry::new(store.clone());
    let analytics = SiloAnalytics::new(store);

    let silos = registry.list()?;
    let mut latest = Vec::with_capacity(silos.len());
    for silo in &silos {
        let reading = analytics.latest_reading(silo.id)?;
        let alerts = reading
            .as_ref()
            .map(|r| crate::core::evaluate_alerts(r, &silo.thresholds));
        latest.push((reading, alerts));
    }

    let rows: Vec<SiloRow<'_>> = silos
        .iter()
        .zip(latest.iter())
        .map(|(silo, (reading, alerts))| SiloRow {
            silo,
            latest: reading.as_ref(),
            alerts: alerts.as_ref(),
        })
        .collect();

    ui::print_silo_table(&rows);
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{} is required", name))
}

fn draft_from_args(matches: &ArgMatches) -> Result<SiloDraft> {
    let name = required(matches, "name")?;
    let radius = parse_number("radius", required(matches, "radius")?)?;
    let height = parse_number("height", required(matches, "height")?)?;
    Ok(SiloDraft::new(name, radius, height))
}

pub fn add(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let registry = SiloRegistry::new(open_store(matches, &config)?);

    let id = registry.register(draft_from_args(matches)?)?;
    let silo = registry.get(id)?;

    println!(
        "{} {} ({})",
        "✓ Registered silo".green(),
        silo.name.bold(),
        format!("id {}", id).cyan()
    );
    println!(
        "{}",
        format!(
            "Default thresholds: moisture>{}% temp>{}°C level<{}%, next service {}",
            silo.thresholds.moisture_percent,
            silo.thresholds.temp_c,
            silo.thresholds.level_percent,
            silo.next_service_date
        )
        .dimmed()
    );
    Ok(())
}

pub fn edit(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let registry = SiloRegistry::new(open_store(matches, &config)?);
    let id = silo_id_arg(matches)?;

    registry.edit(id, draft_from_args(matches)?)?;
    let silo = registry.get(id)?;

    println!(
        "{} {} (r={} m, h={} m)",
        "✓ Updated silo".green(),
        silo.name.bold(),
        silo.geometry.radius_m,
        silo.geometry.height_m
    );
    Ok(())
}

/// Overlay the values given on the command line onto the current thresholds
pub fn apply_threshold_args(current: Thresholds, matches: &ArgMatches) -> Result<Thresholds> {
    let mut thresholds = current;

    if let Some(text) = matches.get_one::<String>("moisture") {
        thresholds.moisture_percent = parse_number("moisture threshold", text)?;
    }
    if let Some(text) = matches.get_one::<String>("temp") {
        thresholds.temp_c = parse_number("temperature threshold", text)?;
    }
    if let Some(text) = matches.get_one::<String>("level") {
        thresholds.level_percent = parse_number("level threshold", text)?;
    }

    Ok(thresholds)
}

pub fn thresholds(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let registry = SiloRegistry::new(open_store(matches, &config)?);
    let id = silo_id_arg(matches)?;

    let silo = registry.get(id)?;
    let updated = apply_threshold_args(silo.thresholds, matches)?;

    if updated == silo.thresholds {
        println!("{}", "No threshold changes given.".yellow());
    } else {
        registry.set_thresholds(id, updated)?;
        println!("{} {}", "✓ Thresholds updated for".green(), silo.name.bold());
    }

    println!(
        "  moisture > {}   temp > {}   level < {}",
        ui::format_percent(updated.moisture_percent).cyan(),
        ui::format_temp(updated.temp_c).cyan(),
        ui::format_percent(updated.level_percent).cyan()
    );
    Ok(())
}

/// Reading values from the command line. A `--distance` is converted to a
/// level using the silo's height.
pub fn sample_from_args(matches: &ArgMatches, silo: &Silo) -> Result<Sample> {
    let temp_c = parse_number("temperature", required(matches, "temp")?)?;
    let humidity = parse_number("humidity", required(matches, "humidity")?)?;

    let sample = match matches.get_one::<String>("distance") {
        Some(text) => Sample::from_distance(
            parse_number("distance", text)?,
            silo.geometry.height_m,
            temp_c,
            humidity,
            ReadingSource::Manual,
        ),
        None => Sample::manual(
            parse_number("level", required(matches, "level")?)?,
            temp_c,
            humidity,
        ),
    };
    Ok(sample)
}

pub fn reading(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(matches, &config)?;
    let registry = SiloRegistry::new(store.clone());
    let analytics = SiloAnalytics::new(store);
    let id = silo_id_arg(matches)?;

    let silo = registry.get(id)?;
    let sample = sample_from_args(matches, &silo)?;

    let reading = analytics.record_reading(id, sample)?;
    println!(
        "{} level {} temp {} humidity {}",
        "✓ Reading recorded:".green(),
        ui::format_percent(reading.level_percent),
        ui::format_temp(reading.temp_c),
        ui::format_percent(reading.humidity)
    );

    if let Some(state) = analytics.alert_state(id)? {
        if state.alerts.is_empty() {
            println!("{}", state.summary().green());
        } else {
            println!("{}", state.summary().red().bold());
        }
    }
    Ok(())
}
