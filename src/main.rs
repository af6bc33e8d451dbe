use anyhow::Result;
use clap::{Arg, ArgAction, ArgGroup, Command};

use silo_monitor::commands;

fn silo_id() -> Arg {
    Arg::new("id")
        .help("Silo id (see 'silo list')")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(i64))
}

fn number_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("NUMBER")
        .help(help)
        .allow_negative_numbers(true)
}

fn build_cli() -> Command {
    Command::new("silo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Grain silo telemetry monitor")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("database")
                .long("db")
                .value_name("PATH")
                .help("SQLite database to use instead of the configured one")
                .global(true),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Use a throwaway in-memory database with the demo silos (ignores --db)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("init")
                .about("Create the database")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Add two demo silos with a reading history")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list").about("List silos with their latest reading"))
        .subcommand(
            Command::new("add")
                .about("Register a silo with default thresholds")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("Display name")
                        .required(true),
                )
                .arg(number_arg("radius", "Inner radius in meters").required(true))
                .arg(number_arg("height", "Height in meters").required(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Change a silo's name and geometry")
                .arg(silo_id())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("NAME")
                        .help("Display name")
                        .required(true),
                )
                .arg(number_arg("radius", "Inner radius in meters").required(true))
                .arg(number_arg("height", "Height in meters").required(true)),
        )
        .subcommand(
            Command::new("thresholds")
                .about("Update alert thresholds (omitted values are kept)")
                .arg(silo_id())
                .arg(number_arg("moisture", "Humidity ceiling in %"))
                .arg(number_arg("temp", "Temperature ceiling in °C"))
                .arg(number_arg("level", "Fill level floor in %")),
        )
        .subcommand(
            Command::new("reading")
                .about("Record a manual reading")
                .arg(silo_id())
                .arg(number_arg("level", "Fill level in %"))
                .arg(number_arg("distance", "Measured distance from the top to the grain in meters"))
                .arg(number_arg("temp", "Temperature in °C").required(true))
                .arg(number_arg("humidity", "Relative humidity in %").required(true))
                .group(
                    ArgGroup::new("fill")
                        .args(["level", "distance"])
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Show alerts, inventory and depletion forecast for a silo")
                .arg(silo_id())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output the report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show a silo's readings, oldest first")
                .arg(silo_id())
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("N")
                        .help("Number of most recent readings (default: trend window from config)")
                        .value_parser(clap::value_parser!(usize))
                        .conflicts_with("all"),
                )
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .help("Show the full history")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Monitor a silo live; type 'help' for line commands")
                .arg(silo_id())
                .arg(
                    Arg::new("simulate")
                        .long("simulate")
                        .help("Generate simulated readings while watching")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Write simulated readings for every silo until Ctrl+C")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Seconds between ticks (default from config: 5)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Fixed random seed for reproducible runs")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Set configuration values (use 'silo set --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("db").about("Set the database path").arg(
                        Arg::new("path")
                            .help("Path to the SQLite database file")
                            .required(true)
                            .index(1),
                    ),
                )
                .subcommand(
                    Command::new("simulation")
                        .about("Turn simulation mode on or off")
                        .arg(
                            Arg::new("state")
                                .help("on | off")
                                .required(true)
                                .index(1),
                        ),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Get configuration values (use 'silo get --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("db").about("Show the database path"))
                .subcommand(Command::new("config").about("Show the full configuration")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .help("bash, zsh, fish, powershell or elvish")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    silo_monitor::init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("init", sub_matches)) => commands::init::execute(sub_matches),
        Some(("list", sub_matches)) => commands::silo::list(sub_matches),
        Some(("add", sub_matches)) => commands::silo::add(sub_matches),
        Some(("edit", sub_matches)) => commands::silo::edit(sub_matches),
        Some(("thresholds", sub_matches)) => commands::silo::thresholds(sub_matches),
        Some(("reading", sub_matches)) => commands::silo::reading(sub_matches),
        Some(("status", sub_matches)) => commands::status::execute(sub_matches),
        Some(("history", sub_matches)) => commands::history::execute(sub_matches),
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches),
        Some(("simulate", sub_matches)) => commands::simulate::execute(sub_matches),
        Some(("set", sub_matches)) => commands::config::handle_set(sub_matches),
        Some(("get", sub_matches)) => commands::config::handle_get(sub_matches),
        Some(("completions", sub_matches)) => {
            commands::completions::execute(sub_matches, &mut build_cli())
        }
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Welcome to silo monitor!");
            println!("Use 'silo --help' for more information.");
            Ok(())
        }
    }
}
