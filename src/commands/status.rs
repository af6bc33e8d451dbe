use anyhow::Result;
use clap::ArgMatches;

use crate::commands::{open_store, silo_id_arg};
use crate::core::{Config, SiloAnalytics, SiloReport};
use crate::ui;

/// One-shot report for a silo
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let analytics = SiloAnalytics::new(open_store(matches, &config)?)
        .with_depletion_config(config.depletion)
        .with_trend_window(config.trend_window);
    let id = silo_id_arg(matches)?;

    let report = SiloReport::build(&analytics, id)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        ui::print_report(&report);
    }

    Ok(())
}
