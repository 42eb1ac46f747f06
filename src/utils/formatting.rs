//! Formatting utilities used for CLI and export outputs.

/// Total worked time as stored on the vehicle: `"{h}h {m}m"`.
/// No leading zeros, no pluralisation: 125 → "2h 5m", 0 → "0h 0m".
pub fn mins2hm(total_minutes: i64) -> String {
    let m = total_minutes.max(0);
    format!("{}h {}m", m / 60, m % 60)
}

/// Duration column in tables: "--" while the session is still open.
pub fn duration_cell(minutes: Option<i64>) -> String {
    match minutes {
        Some(m) => format!("{} min", m),
        None => "--".to_string(),
    }
}

/// Text column in tables: empty string for missing values.
pub fn opt_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "Si" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mins2hm_has_no_leading_zeros() {
        assert_eq!(mins2hm(0), "0h 0m");
        assert_eq!(mins2hm(1), "0h 1m");
        assert_eq!(mins2hm(60), "1h 0m");
        assert_eq!(mins2hm(125), "2h 5m");
        assert_eq!(mins2hm(600), "10h 0m");
    }
}
