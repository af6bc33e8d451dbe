use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::commands::open_store;
use crate::core::simulator::{simulator_task, ReadingSimulator};
use crate::core::Config;

/// Run only the simulator loop until Ctrl+C
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(matches, &config)?;

    let mut settings = config.simulation.clone();
    if let Some(secs) = matches.get_one::<u64>("interval") {
        settings.interval_secs = *secs;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        settings.seed = Some(*seed);
    }
    anyhow::ensure!(
        settings.interval_secs > 0,
        "simulation interval must be at least 1 second"
    );
    settings.params.validate()?;

    let silos = store.list_silos()?;
    if silos.is_empty() {
        println!(
            "{}",
            "No silos registered, nothing to simulate yet. Readings start once silos exist."
                .yellow()
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build simulator runtime")?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    println!(
        "{}",
        format!(
            "Simulating {} silos every {}s",
            silos.len(),
            settings.interval_secs
        )
        .cyan()
        .bold()
    );
    println!("{}", "Press Ctrl+C to stop".dimmed());

    let simulator = ReadingSimulator::from_seed(settings.params, settings.seed);
    runtime.block_on(simulator_task(
        store,
        simulator,
        Duration::from_secs(settings.interval_secs),
        shutdown_rx,
    ));

    println!("{}", "Simulation stopped.".dimmed());
    Ok(())
}
