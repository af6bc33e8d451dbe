use chrono::{DateTime, Local, Utc};
use colored::*;

use crate::core::alerts::{AlertState, AlertStatus, GrainCondition};
use crate::core::depletion::DepletionEstimate;
use crate::core::model::{Reading, Silo};
use crate::core::report::SiloReport;
use crate::core::window::TelemetryWindow;

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Format a UTC timestamp in local time (YYYY-MM-DD HH:MM:SS)
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    let datetime: DateTime<Local> = timestamp.with_timezone(&Local);
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_temp(value: f64) -> String {
    format!("{:.1}°C", value)
}

/// One character per level on a 0-100 scale
pub fn level_sparkline(levels: &[f64]) -> String {
    levels
        .iter()
        .map(|level| {
            let clamped = if level.is_nan() { 0.0 } else { level.clamp(0.0, 100.0) };
            let idx = ((clamped / 100.0) * (SPARK_BARS.len() - 1) as f64).round() as usize;
            SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
        })
        .collect()
}

/// Keep the last `width` values, for sparklines that must fit a line
fn tail(values: &[f64], width: usize) -> &[f64] {
    &values[values.len().saturating_sub(width)..]
}

fn colored_status(alerts: Option<&AlertState>) -> ColoredString {
    match alerts {
        None => "NO DATA".dimmed(),
        Some(state) => match state.status {
            AlertStatus::Normal => state.summary().green().bold(),
            AlertStatus::Alert => state.summary().red().bold(),
        },
    }
}

fn colored_condition(condition: GrainCondition) -> ColoredString {
    match condition {
        GrainCondition::Optimal => condition.label().green(),
        GrainCondition::OptimalRefillNeeded => condition.label().yellow(),
        GrainCondition::SpoilageRisk => condition.label().red().bold(),
    }
}

fn colored_depletion(estimate: &DepletionEstimate) -> ColoredString {
    match estimate {
        DepletionEstimate::Depleting(forecast) if forecast.days_left < 1.0 => {
            estimate.to_string().red().bold()
        }
        DepletionEstimate::Depleting(_) => estimate.to_string().yellow(),
        DepletionEstimate::StableLowLevel => estimate.to_string().yellow(),
        DepletionEstimate::Stable => estimate.to_string().green(),
        DepletionEstimate::InsufficientData => estimate.to_string().dimmed(),
    }
}

/// A row of the silo overview table
pub struct SiloRow<'a> {
    pub silo: &'a Silo,
    pub latest: Option<&'a Reading>,
    pub alerts: Option<&'a AlertState>,
}

pub fn print_silo_table(rows: &[SiloRow<'_>]) {
    if rows.is_empty() {
        println!("{}", "No silos registered.".yellow());
        println!("{}", "Add one with: silo add --name <NAME> --radius <M> --height <M>".dimmed());
        return;
    }

    let name_width = rows
        .iter()
        .map(|r| r.silo.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{}",
        format!(
            "{:>4}  {:<name_width$}  {:>8}  {:>8}  {:>8}  {}",
            "ID", "NAME", "LEVEL", "TEMP", "HUMID", "STATUS",
        )
        .bold()
    );
    println!("{}", "-".repeat(name_width + 50));

    for row in rows {
        let (level, temp, humidity) = match row.latest {
            Some(r) => (
                format_percent(r.level_percent),
                format_temp(r.temp_c),
                format_percent(r.humidity),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        println!(
            "{:>4}  {:<name_width$}  {:>8}  {:>8}  {:>8}  {}",
            row.silo.id.to_string().cyan(),
            row.silo.name,
            level,
            temp,
            humidity,
            colored_status(row.alerts),
        );
    }
}

pub fn print_report(report: &SiloReport) {
    let silo = &report.silo;

    println!("\n{}", format!("SILO {} - {}", silo.id, silo.name).bold().bright_cyan());
    println!("{}", "=".repeat(60));

    println!(
        "  {:<18} r={:.2} m  h={:.2} m  ({:.1} m³)",
        "Geometry:".white(),
        silo.geometry.radius_m,
        silo.geometry.height_m,
        silo.geometry.capacity_m3(),
    );
    println!(
        "  {:<18} moisture>{}  temp>{}  level<{}",
        "Thresholds:".white(),
        format_percent(silo.thresholds.moisture_percent),
        format_temp(silo.thresholds.temp_c),
        format_percent(silo.thresholds.level_percent),
    );
    println!(
        "  {:<18} {}",
        "Next service:".white(),
        silo.next_service_date.format("%Y-%m-%d")
    );

    println!("\n{}", "LATEST READING".bold());
    match &report.latest {
        Some(reading) => {
            println!("  {:<18} {}", "Time:".white(), format_time(reading.timestamp));
            println!(
                "  {:<18} {} ({:.2} m to grain)",
                "Level:".white(),
                format_percent(reading.level_percent).bold(),
                reading.distance_m
            );
            println!("  {:<18} {}", "Temperature:".white(), format_temp(reading.temp_c));
            println!("  {:<18} {}", "Humidity:".white(), format_percent(reading.humidity));
            println!("  {:<18} {}", "Source:".white(), reading.source.as_str().dimmed());
        }
        None => println!("  {}", "No readings recorded yet".dimmed()),
    }

    if let Some(inventory) = &report.inventory {
        println!(
            "  {:<18} {:.1} m³ / {:.1} t",
            "Inventory:".white(),
            inventory.volume_m3,
            inventory.mass_t
        );
    }

    println!("\n{}", "ANALYTICS".bold());
    println!("  {:<18} {}", "Status:".white(), colored_status(report.alerts.as_ref()));
    if let Some(alerts) = &report.alerts {
        println!("  {:<18} {}", "Condition:".white(), colored_condition(alerts.condition));
    }
    println!(
        "  {:<18} {}",
        "Days until empty:".white(),
        colored_depletion(&report.depletion)
    );

    if !report.trend.is_empty() {
        let levels = report.trend.levels();
        println!(
            "  {:<18} {} ({} readings)",
            "Level trend:".white(),
            level_sparkline(tail(&levels, 48)).cyan(),
            levels.len()
        );

        let temps = report.trend.temperatures();
        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        println!(
            "  {:<18} {} to {}",
            "Temp range:".white(),
            format_temp(min),
            format_temp(max)
        );
    }
    println!();
}

/// One-line summary for streaming output
pub fn format_snapshot_line(report: &SiloReport) -> String {
    let reading = match &report.latest {
        Some(r) => format!(
            "level {}  temp {}  humidity {}",
            format_percent(r.level_percent),
            format_temp(r.temp_c),
            format_percent(r.humidity)
        ),
        None => "no readings".to_string(),
    };

    format!(
        "[{}] {}  {}  {}  eta {}",
        format_time(report.generated_at).dimmed(),
        report.silo.name.bold(),
        reading,
        colored_status(report.alerts.as_ref()),
        colored_depletion(&report.depletion),
    )
}

pub fn print_history(silo: &Silo, window: &TelemetryWindow) {
    println!(
        "\n{}",
        format!("HISTORY - {} ({} readings)", silo.name, window.len()).bold().bright_cyan()
    );

    if window.is_empty() {
        println!("  {}", "No readings recorded yet".dimmed());
        return;
    }

    println!(
        "{}",
        format!(
            "  {:<19}  {:>8}  {:>9}  {:>8}  {:>8}  {}",
            "TIME", "LEVEL", "DISTANCE", "TEMP", "HUMID", "SOURCE"
        )
        .bold()
    );

    for reading in window.readings() {
        let level = format_percent(reading.level_percent);
        let level = if reading.level_percent < silo.thresholds.level_percent {
            level.red()
        } else {
            level.normal()
        };

        println!(
            "  {:<19}  {:>8}  {:>8.2}m  {:>8}  {:>8}  {}",
            format_time(reading.timestamp),
            level,
            reading.distance_m,
            format_temp(reading.temp_c),
            format_percent(reading.humidity),
            reading.source.as_str().dimmed(),
        );
    }
}
