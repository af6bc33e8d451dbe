use anyhow::Result;
use clap::ArgMatches;

use crate::commands::{open_store, silo_id_arg};
use crate::core::{Config, SiloAnalytics, SiloRegistry, WindowBound};
use crate::ui;

/// `--all`, `--limit N`, or the configured trend window
pub fn window_bound(matches: &ArgMatches, config: &Config) -> WindowBound {
    if matches.get_flag("all") {
        return WindowBound::All;
    }
    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(config.trend_window);
    WindowBound::Recent(limit)
}

/// Print a silo's readings oldest first
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(matches, &config)?;
    let registry = SiloRegistry::new(store.clone());
    let analytics = SiloAnalytics::new(store);
    let id = silo_id_arg(matches)?;

    let bound = window_bound(matches, &config);

    let silo = registry.get(id)?;
    let window = analytics.window(id, bound)?;
    ui::print_history(&silo, &window);

    Ok(())
}
