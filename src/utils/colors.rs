/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

use crate::models::vehicle::VehicleStatus;

/// Status color: completed → blue, in progress → yellow.
pub fn color_for_status(status: VehicleStatus) -> &'static str {
    match status {
        VehicleStatus::Completed => BLUE,
        VehicleStatus::InProgress => YELLOW,
    }
}

/// Ritorna formattazione colorata di un valore opzionale.
///
/// Esempio:
/// `colorize_optional("--")` → "<grey>--<reset>"
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" || value.trim() == "0h 0m" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

/// Open sessions in green, closed ones left plain.
pub fn colorize_open(value: &str, open: bool) -> String {
    if open {
        format!("{GREEN}{value}{RESET}")
    } else {
        value.to_string()
    }
}
