use crate::core::Config;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("db", sub_matches)) => set_database(sub_matches),
        Some(("simulation", sub_matches)) => set_simulation(sub_matches),
        _ => {
            println!("Use 'silo set --help' for more information.");
            Ok(())
        }
    }
}

fn set_database(matches: &clap::ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .context("Path argument is required")?;

    if path.trim().is_empty() {
        bail!("Database path cannot be empty");
    }

    let path_buf = Path::new(path);
    if !path_buf.exists() {
        println!(
            "{}",
            "The database will be created on first use (run 'silo init').".dimmed()
        );
    }

    let mut config = Config::load()?;
    config.set_database_path(path.to_string());
    config.save()?;

    println!("{} {}", "✓ Database path set to:".green(), path);
    Ok(())
}

/// Accepts on/off style switches
pub fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn set_simulation(matches: &clap::ArgMatches) -> Result<()> {
    let value = matches
        .get_one::<String>("state")
        .context("State argument is required")?;

    let Some(enabled) = parse_switch(value) else {
        bail!("Expected 'on' or 'off', got '{}'", value);
    };

    let mut config = Config::load()?;
    config.set_simulation_enabled(enabled);
    config.save()?;

    let state = if enabled { "enabled".green() } else { "disabled".yellow() };
    println!("✓ Simulation mode {}", state);
    Ok(())
}

pub fn handle_get(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("db", _)) => get_database(),
        Some(("config", _)) => get_config(),
        _ => {
            println!("Use 'silo get --help' for more information.");
            Ok(())
        }
    }
}

fn get_database() -> Result<()> {
    let config = Config::load()?;
    let path = config.database_path()?;

    println!("{}", "Database path:".white());
    println!("{}", path.display().to_string().cyan().bold());
    if config.database_path.is_none() {
        println!("{}", "(default location, change with 'silo set db <path>')".dimmed());
    }
    Ok(())
}

fn get_config() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{} {}", "Config file:".white(), path.display().to_string().dimmed());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
