//! Work session record store.

use crate::errors::AppError;
use crate::models::work_session::WorkSession;
use crate::utils::time::{parse_db_timestamp, to_db_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const SELECT_SESSION: &str =
    "SELECT id, vehicle_id, operator_name, start_time, end_time, duration_minutes
     FROM work_sessions";

fn parse_ts(idx: usize, raw: &str) -> Result<DateTime<Utc>> {
    parse_db_timestamp(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid timestamp: {}", raw))),
        )
    })
}

pub fn map_row(row: &Row) -> Result<WorkSession> {
    let start: String = row.get("start_time")?;
    let end: Option<String> = row.get("end_time")?;

    Ok(WorkSession {
        id: row.get("id")?,
        vehicle_id: row.get("vehicle_id")?,
        operator_name: row.get("operator_name")?,
        start_time: parse_ts(3, &start)?,
        end_time: end.as_deref().map(|e| parse_ts(4, e)).transpose()?,
        duration_minutes: row.get("duration_minutes")?,
    })
}

fn collect(conn: &Connection, sql: &str, vehicle_id: i64) -> Result<Vec<WorkSession>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([vehicle_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// The open session of this exact (vehicle, operator) pair, if any.
pub fn find_open(conn: &Connection, vehicle_id: i64, operator: &str) -> Result<Option<WorkSession>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_SESSION}
         WHERE vehicle_id = ?1 AND operator_name = ?2 AND end_time IS NULL
         ORDER BY start_time ASC, id ASC
         LIMIT 1"
    ))?;
    stmt.query_row(params![vehicle_id, operator], map_row)
        .optional()
}

pub fn find_session(conn: &Connection, id: i64) -> Result<Option<WorkSession>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_SESSION} WHERE id = ?1"))?;
    stmt.query_row([id], map_row).optional()
}

/// Insert a new open session and return it.
pub fn insert_session(
    conn: &Connection,
    vehicle_id: i64,
    operator: &str,
    start: DateTime<Utc>,
) -> Result<WorkSession> {
    conn.execute(
        "INSERT INTO work_sessions (vehicle_id, operator_name, start_time, end_time, duration_minutes)
         VALUES (?1, ?2, ?3, NULL, NULL)",
        params![vehicle_id, operator, to_db_timestamp(start)],
    )?;

    Ok(WorkSession {
        id: conn.last_insert_rowid(),
        vehicle_id,
        operator_name: operator.to_string(),
        start_time: start,
        end_time: None,
        duration_minutes: None,
    })
}

/// Close a session only if it is still open (compare-and-set on `end_time IS NULL`).
/// Returns false when someone else closed it first.
pub fn close_if_open(
    conn: &Connection,
    id: i64,
    end: DateTime<Utc>,
    duration_minutes: i64,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE work_sessions
         SET end_time = ?1, duration_minutes = ?2
         WHERE id = ?3 AND end_time IS NULL",
        params![to_db_timestamp(end), duration_minutes, id],
    )?;
    Ok(changed == 1)
}

/// Open sessions of a vehicle, any operator.
pub fn list_open_for_vehicle(conn: &Connection, vehicle_id: i64) -> Result<Vec<WorkSession>> {
    collect(
        conn,
        &format!(
            "{SELECT_SESSION}
             WHERE vehicle_id = ?1 AND end_time IS NULL
             ORDER BY start_time ASC, id ASC"
        ),
        vehicle_id,
    )
}

/// All sessions of a vehicle, most recent first (ties: higher id first).
pub fn list_for_vehicle(conn: &Connection, vehicle_id: i64) -> Result<Vec<WorkSession>> {
    collect(
        conn,
        &format!(
            "{SELECT_SESSION}
             WHERE vehicle_id = ?1
             ORDER BY start_time DESC, id DESC"
        ),
        vehicle_id,
    )
}

/// Every session in the store, grouped by vehicle, oldest first.
pub fn list_all(conn: &Connection) -> Result<Vec<WorkSession>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_SESSION} ORDER BY vehicle_id ASC, start_time ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Sum of closed durations for a vehicle, every operator.
pub fn sum_minutes_for_vehicle(conn: &Connection, vehicle_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(duration_minutes), 0) FROM work_sessions WHERE vehicle_id = ?1",
        [vehicle_id],
        |row| row.get(0),
    )
}

pub fn count_for_vehicle(conn: &Connection, vehicle_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM work_sessions WHERE vehicle_id = ?1",
        [vehicle_id],
        |row| row.get(0),
    )
}

pub fn delete_for_vehicle(conn: &Connection, vehicle_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM work_sessions WHERE vehicle_id = ?1", [vehicle_id])
}

/// (total, open) session counts.
pub fn count_sessions(conn: &Connection) -> Result<(i64, i64)> {
    conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN end_time IS NULL THEN 1 ELSE 0 END), 0)
         FROM work_sessions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

/// First and last session start, as stored.
pub fn start_range(conn: &Connection) -> Result<(Option<String>, Option<String>)> {
    conn.query_row(
        "SELECT MIN(start_time), MAX(start_time) FROM work_sessions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}
