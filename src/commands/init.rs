use anyhow::Result;
use chrono::Utc;
use clap::ArgMatches;
use colored::Colorize;

use crate::commands::{is_ephemeral, open_store, resolve_database_path};
use crate::core::store::seed_demo_data;
use crate::core::Config;
use crate::ui;

/// Create the database and optionally seed demo silos
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(matches, &config)?;

    if is_ephemeral(matches) {
        ui::warn("Ephemeral mode: the in-memory database is discarded on exit.");
    } else {
        let path = resolve_database_path(matches, &config)?;
        println!("{} {}", "✓ Database ready at:".green(), path.display());
    }

    if matches.get_flag("seed") {
        let created = seed_demo_data(store.as_ref(), Utc::now())?;
        if created == 0 {
            ui::warn("Database already contains silos, demo data not added.");
        } else {
            println!(
                "{}",
                format!("✓ Seeded {} demo silos with reading history", created).green()
            );
        }
    }

    let silos = store.list_silos()?;
    println!("{}", format!("{} silos registered", silos.len()).dimmed());

    Ok(())
}
