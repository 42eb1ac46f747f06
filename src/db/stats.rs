use crate::db::pool::DbPool;
use crate::db::{sessions, vehicles};
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::time::{format_local, parse_db_timestamp};
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) VEHICLES
    //
    let (in_progress, completed) = vehicles::count_by_status(&pool.conn)?;
    println!(
        "{}• Vehicles:{} {}{}{} ({} in progress, {} completed)",
        CYAN,
        RESET,
        GREEN,
        in_progress + completed,
        RESET,
        in_progress,
        completed
    );

    //
    // 3) SESSIONS
    //
    let (total, open) = sessions::count_sessions(&pool.conn)?;
    println!(
        "{}• Work sessions:{} {}{}{} ({} open)",
        CYAN, RESET, GREEN, total, RESET, open
    );

    //
    // 4) DATE RANGE
    //
    let (first, last) = sessions::start_range(&pool.conn)?;
    let fmt = |s: Option<String>| {
        s.as_deref()
            .and_then(parse_db_timestamp)
            .map(format_local)
            .unwrap_or_else(|| format!("{GREY}--{RESET}"))
    };

    println!("{}• Sessions started:{}", CYAN, RESET);
    println!("    from: {}", fmt(first));
    println!("    to:   {}", fmt(last));

    println!();
    Ok(())
}
