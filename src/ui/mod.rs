// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{
    format_percent, format_snapshot_line, format_temp, format_time, level_sparkline,
    print_history, print_report, print_silo_table, SiloRow,
};
pub use prompts::{dimmed, error, info, success, warn};
