use crate::db::log::{LogEntry, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::table::strip_ansi;
use ansi_term::Colour;

const OP_MAX_WIDTH: usize = 60;

/// Restituisce il colore ANSI in base all'operazione
fn color_for_operation(op: &str) -> Colour {
    match op {
        "car_add" => Colour::Green,
        "car_del" => Colour::Red,
        "car_edit" | "car_hours" => Colour::Yellow,
        "session_start" => Colour::Cyan,
        "session_stop" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "backup" | "export" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51), // arancione
        _ => Colour::White,
    }
}

/// "operation (target)", truncated to `max` visible chars with only the
/// operation word coloured.
fn render_op_target(entry: &LogEntry, max: usize) -> String {
    let color = color_for_operation(&entry.operation);

    let visible = if entry.target.is_empty() {
        entry.operation.clone()
    } else {
        format!("{} ({})", entry.operation, entry.target)
    };

    let truncated = if visible.chars().count() > max {
        let mut s = visible.chars().take(max - 3).collect::<String>();
        s.push_str("...");
        s
    } else {
        visible
    };

    match truncated.split_once(' ') {
        Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
        None => color.paint(truncated.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let rendered: Vec<(String, String)> = entries
            .iter()
            .map(|e| {
                let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| e.date.clone());
                (date, render_op_target(e, OP_MAX_WIDTH))
            })
            .collect();

        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = rendered.iter().map(|(d, _)| d.len()).max().unwrap_or(10);
        let op_w = rendered
            .iter()
            .map(|(_, op)| strip_ansi(op).chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_MAX_WIDTH);

        println!("📜 Internal log:\n");

        for (entry, (date, op_target)) in entries.iter().zip(rendered) {
            // padding (calcolato sulle dimensioni reali SENZA ANSI)
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&op_target).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                entry.id,
                date,
                op_target,
                padding,
                entry.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(operation: &str, target: &str) -> LogEntry {
        LogEntry {
            id: 1,
            date: "2025-10-19T10:00:00+02:00".into(),
            operation: operation.into(),
            target: target.into(),
            message: "msg".into(),
        }
    }

    #[test]
    fn long_targets_are_truncated_on_visible_text() {
        let long = "x".repeat(100);
        let out = render_op_target(&entry("session_stop", &long), 20);
        let visible = strip_ansi(&out);
        assert_eq!(visible.chars().count(), 20);
        assert!(visible.starts_with("session_stop ("));
        assert!(visible.ends_with("..."));
    }

    #[test]
    fn empty_target_shows_operation_only() {
        let out = render_op_target(&entry("init", ""), 60);
        assert_eq!(strip_ansi(&out), "init");
    }
}
