//! Live monitor for one silo.
//!
//! Runs the monitor runtime, prints every new snapshot and forwards line
//! commands typed on stdin to the runtime.

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::commands::{open_store, silo_id_arg};
use crate::core::model::{Sample, SiloId, Thresholds};
use crate::core::monitor::{MonitorOptions, MonitorRuntime, RefreshReason, SimulatorOptions};
use crate::core::validation::parse_number;
use crate::core::Config;
use crate::error::SiloError;
use crate::ui;

const IDLE_SLEEP: Duration = Duration::from_millis(100);

/// A line command typed while watching
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchCommand {
    Select(SiloId),
    TempThreshold(f64),
    MoistureThreshold(f64),
    LevelThreshold(f64),
    Reading {
        level_percent: f64,
        temp_c: f64,
        humidity: f64,
    },
    Refresh,
    Help,
    Quit,
}

fn argument<'a>(
    args: &[&'a str],
    index: usize,
    field: &str,
) -> std::result::Result<&'a str, SiloError> {
    args.get(index)
        .copied()
        .ok_or_else(|| SiloError::validation(field, "value is missing"))
}

/// Parse one stdin line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> std::result::Result<Option<WatchCommand>, SiloError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_lowercase().as_str() {
        "select" => {
            let text = argument(&args, 0, "silo id")?;
            let id = text
                .parse::<i64>()
                .map_err(|_| SiloError::validation("silo id", format!("'{}' is not an id", text)))?;
            WatchCommand::Select(SiloId(id))
        }
        "temp" => WatchCommand::TempThreshold(parse_number(
            "temperature threshold",
            argument(&args, 0, "temperature threshold")?,
        )?),
        "moisture" => WatchCommand::MoistureThreshold(parse_number(
            "moisture threshold",
            argument(&args, 0, "moisture threshold")?,
        )?),
        "level" => WatchCommand::LevelThreshold(parse_number(
            "level threshold",
            argument(&args, 0, "level threshold")?,
        )?),
        "reading" => WatchCommand::Reading {
            level_percent: parse_number("level", argument(&args, 0, "level")?)?,
            temp_c: parse_number("temperature", argument(&args, 1, "temperature")?)?,
            humidity: parse_number("humidity", argument(&args, 2, "humidity")?)?,
        },
        "refresh" => WatchCommand::Refresh,
        "help" | "?" => WatchCommand::Help,
        "quit" | "exit" | "q" => WatchCommand::Quit,
        other => {
            return Err(SiloError::validation(
                "command",
                format!("unknown command '{}', type 'help'", other),
            ))
        }
    };

    Ok(Some(command))
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  {}   switch the watched silo", "select <ID>".cyan());
    println!("  {}    set the temperature threshold (°C)", "temp <C>".cyan());
    println!("  {}  set the moisture threshold (%)", "moisture <%>".cyan());
    println!("  {}     set the low level threshold (%)", "level <%>".cyan());
    println!("  {}  record a manual reading", "reading <LEVEL> <TEMP> <HUMIDITY>".cyan());
    println!("  {}       recompute now", "refresh".cyan());
    println!("  {}          stop watching", "quit".cyan());
}

/// Apply a threshold edit to the currently selected silo
fn update_selected_thresholds(
    runtime: &MonitorRuntime,
    change: impl FnOnce(&mut Thresholds),
) -> Result<()> {
    let id = runtime.selected().context("No silo selected")?;
    let silo = runtime.registry().get(id)?;

    let mut thresholds = silo.thresholds;
    change(&mut thresholds);
    runtime.update_thresholds(id, thresholds)?;

    ui::success(&format!("✓ Thresholds updated for {}", silo.name));
    Ok(())
}

/// Run one command against the runtime. Returns `false` when watching should stop.
pub fn apply_command(runtime: &MonitorRuntime, command: WatchCommand) -> Result<bool> {
    match command {
        WatchCommand::Select(id) => {
            runtime.select_silo(id)?;
            ui::info(&format!("Watching silo {}", id));
        }
        WatchCommand::TempThreshold(value) => {
            update_selected_thresholds(runtime, |t| t.temp_c = value)?
        }
        WatchCommand::MoistureThreshold(value) => {
            update_selected_thresholds(runtime, |t| t.moisture_percent = value)?
        }
        WatchCommand::LevelThreshold(value) => {
            update_selected_thresholds(runtime, |t| t.level_percent = value)?
        }
        WatchCommand::Reading {
            level_percent,
            temp_c,
            humidity,
        } => {
            let id = runtime.selected().context("No silo selected")?;
            runtime.record_reading(id, Sample::manual(level_percent, temp_c, humidity))?;
            ui::success("✓ Reading recorded");
        }
        WatchCommand::Refresh => runtime.request_refresh(RefreshReason::Requested),
        WatchCommand::Help => print_help(),
        WatchCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Forward stdin lines over a channel so the watch loop never blocks on input
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("silo-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| log::warn!("Line commands unavailable: {}", e));
    rx
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    let store = open_store(matches, &config)?;
    let id = silo_id_arg(matches)?;

    let mut options = MonitorOptions::from_config(&config);
    if matches.get_flag("simulate") && options.simulator.is_none() {
        options.simulator = Some(SimulatorOptions {
            interval: Duration::from_secs(config.simulation.interval_secs),
            params: config.simulation.params,
            seed: config.simulation.seed,
        });
    }
    let simulating = options.simulator.is_some();

    let runtime = MonitorRuntime::start(store, options)?;
    runtime.select_silo(id)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    println!("{}", format!("Watching silo {}", id).cyan().bold());
    if simulating {
        println!("{}", "Simulation mode is on".yellow());
    }
    println!("{}", "Type 'help' for commands, Ctrl+C to stop".dimmed());
    println!();

    let commands = spawn_stdin_reader();
    let mut stdin_open = true;
    let mut snapshots = runtime.subscribe();

    'watch: while running.load(Ordering::SeqCst) {
        while stdin_open {
            let line = match commands.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    ui::dimmed("Input closed, line commands disabled");
                    stdin_open = false;
                    break;
                }
            };

            let outcome = parse_command(&line)
                .map_err(anyhow::Error::from)
                .and_then(|cmd| match cmd {
                    Some(cmd) => apply_command(&runtime, cmd),
                    None => Ok(true),
                });

            match outcome {
                Ok(true) => {}
                Ok(false) => break 'watch,
                Err(e) => ui::error(&format!("✗ {}", e)),
            }
        }

        if snapshots.has_changed().unwrap_or(false) {
            let snapshot = snapshots.borrow_and_update().clone();
            if let Some(report) = snapshot {
                println!("{}", ui::format_snapshot_line(&report));
            }
        }

        thread::sleep(IDLE_SLEEP);
    }

    println!();
    println!("{}", "Stopped watching.".dimmed());
    runtime.shutdown();
    Ok(())
}
