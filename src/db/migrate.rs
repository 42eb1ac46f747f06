use crate::core::backup::zip_single_file;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use crate::utils::time::{parse_db_timestamp, to_db_timestamp, whole_minutes_between};
use chrono::{DateTime, Local, Utc};
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;

const IMPORT_LEGACY_TABLES: &str = "20251019_0001_import_legacy_tables";
const OPEN_SESSION_GUARD: &str = "20251019_0002_open_session_guard";

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Create the `vehicles` table.
fn create_vehicles_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS vehicles (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            model         TEXT NOT NULL,
            plate         TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'in_progress'
                          CHECK(status IN ('in_progress','completed')),
            lavorazioni   TEXT,
            note          TEXT,
            photo         INTEGER NOT NULL DEFAULT 0,
            partial_hours TEXT,
            total_hours   TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_vehicles_status ON vehicles(status);
        "#,
    )?;
    Ok(())
}

/// Create the `work_sessions` table.
///
/// No foreign key on `vehicle_id`: what happens to sessions on vehicle
/// deletion is decided by `on_vehicle_delete` in the configuration.
fn create_work_sessions_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS work_sessions (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            vehicle_id       INTEGER NOT NULL,
            operator_name    TEXT NOT NULL,
            start_time       TEXT NOT NULL,
            end_time         TEXT,
            duration_minutes INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_work_sessions_vehicle_start
            ON work_sessions(vehicle_id, start_time);
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        params![Local::now().to_rfc3339(), version, message],
    )?;
    Ok(())
}

/// At most one open session per (vehicle, operator), enforced by the store too.
fn migrate_open_session_guard(conn: &Connection) -> AppResult<()> {
    if is_applied(conn, OPEN_SESSION_GUARD)? {
        return Ok(());
    }

    let duplicates: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (
             SELECT vehicle_id, operator_name FROM work_sessions
             WHERE end_time IS NULL
             GROUP BY vehicle_id, operator_name
             HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )?;

    if duplicates > 0 {
        return Err(AppError::Migration(format!(
            "{} (vehicle, operator) pairs have more than one open session; stop them before migrating",
            duplicates
        )));
    }

    conn.execute_batch(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS ux_work_sessions_open
            ON work_sessions(vehicle_id, operator_name)
            WHERE end_time IS NULL;
        "#,
    )?;

    mark_applied(
        conn,
        OPEN_SESSION_GUARD,
        "Unique index on open sessions per vehicle/operator",
    )?;

    success(format!(
        "Migration applied: {} → open sessions are unique per vehicle/operator",
        OPEN_SESSION_GUARD
    ));

    Ok(())
}

/// Row of the `Cars` table written by the old web back-end.
struct LegacyCar {
    id: i64,
    model: Option<String>,
    plate: Option<String>,
    status: Option<String>,
    lavorazioni: Option<String>,
    note: Option<String>,
    photo: Option<bool>,
    partial_hours: Option<String>,
    total_hours: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Row of the `WorkSessions` table. Every column is optional: rows the old
/// back-end left incomplete are skipped, not fatal.
struct LegacySession {
    id: i64,
    car_id: Option<i64>,
    operator: Option<String>,
    start: Option<String>,
    end: Option<String>,
    duration: Option<i64>,
}

/// Dates written by the old web back-end: `YYYY-MM-DD HH:MM:SS.SSS +00:00`.
fn parse_legacy_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f %:z")
        .ok()
        .map(|d| d.with_timezone(&Utc))
        .or_else(|| parse_db_timestamp(s))
}

fn backup_before_migration(conn: &Connection) -> AppResult<()> {
    let db_path: String =
        conn.query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))?;

    // In-memory DB: nothing to save
    if db_path.is_empty() {
        warning("In-memory database, backup skipped.");
        return Ok(());
    }

    let src = Path::new(&db_path);
    let backup_name = format!(
        "{}-backup_db_pre_legacy_import.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let dest = src
        .parent()
        .map(|p| p.join(&backup_name))
        .unwrap_or_else(|| backup_name.clone().into());

    zip_single_file(src, &dest, "database.sqlite")?;
    success(format!("📦 Backup created: {}", dest.display()));
    Ok(())
}

fn load_legacy_cars(conn: &Connection) -> Result<Vec<LegacyCar>> {
    let mut stmt = conn.prepare(
        "SELECT id, model, plate, status, lavorazioni, note, photo,
                partialHours, totalHours, createdAt, updatedAt
         FROM Cars ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LegacyCar {
            id: row.get(0)?,
            model: row.get(1)?,
            plate: row.get(2)?,
            status: row.get(3)?,
            lavorazioni: row.get(4)?,
            note: row.get(5)?,
            photo: row.get(6)?,
            partial_hours: row.get(7)?,
            total_hours: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn load_legacy_sessions(conn: &Connection) -> Result<Vec<LegacySession>> {
    let mut stmt = conn.prepare(
        "SELECT id, carId, operatorName, startTime, endTime, durationMinutes
         FROM WorkSessions ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LegacySession {
            id: row.get(0)?,
            car_id: row.get(1)?,
            operator: row.get(2)?,
            start: row.get(3)?,
            end: row.get(4)?,
            duration: row.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert_legacy_car(conn: &Connection, car: &LegacyCar, now: &str) -> Result<()> {
    let status = match car.status.as_deref() {
        Some("completed") => "completed",
        _ => "in_progress",
    };
    let created = car
        .created_at
        .as_deref()
        .and_then(parse_legacy_date)
        .map(to_db_timestamp)
        .unwrap_or_else(|| now.to_string());
    let updated = car
        .updated_at
        .as_deref()
        .and_then(parse_legacy_date)
        .map(to_db_timestamp)
        .unwrap_or_else(|| created.clone());

    conn.execute(
        "INSERT INTO vehicles (id, model, plate, status, lavorazioni, note, photo,
                               partial_hours, total_hours, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            car.id,
            car.model.clone().unwrap_or_default(),
            car.plate.clone().unwrap_or_default(),
            status,
            car.lavorazioni,
            car.note,
            car.photo.unwrap_or(false),
            car.partial_hours,
            car.total_hours,
            created,
            updated
        ],
    )?;
    Ok(())
}

/// Insert one legacy session. Returns false when the row is unusable.
fn insert_legacy_session(conn: &Connection, s: &LegacySession) -> Result<bool> {
    let operator = s.operator.as_deref().map(str::trim).unwrap_or("");
    let start = s.start.as_deref().and_then(parse_legacy_date);

    let (Some(car_id), Some(start)) = (s.car_id, start) else {
        return Ok(false);
    };
    if operator.is_empty() {
        return Ok(false);
    }

    let end = s.end.as_deref().and_then(parse_legacy_date);
    let duration = match (s.duration, end) {
        (Some(d), Some(_)) => Some(d),
        (None, Some(e)) => Some(whole_minutes_between(start, e)),
        (_, None) => None,
    };

    conn.execute(
        "INSERT INTO work_sessions (id, vehicle_id, operator_name, start_time, end_time, duration_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            s.id,
            car_id,
            operator,
            to_db_timestamp(start),
            end.map(to_db_timestamp),
            duration
        ],
    )?;
    Ok(true)
}

/// Import `Cars` / `WorkSessions` rows left by the old web back-end,
/// keeping their ids. Runs once, and only into an empty `vehicles` table.
///
/// All or nothing: the rows and the `migration_applied` mark share one
/// transaction, so a failure leaves `vehicles` empty and the next open retries.
fn migrate_import_legacy_tables(conn: &Connection) -> AppResult<()> {
    if is_applied(conn, IMPORT_LEGACY_TABLES)? || !table_exists(conn, "Cars")? {
        return Ok(());
    }

    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))?;
    if existing > 0 {
        warning("Legacy 'Cars' table found but 'vehicles' is not empty, import skipped.");
        return Ok(());
    }

    warning("Legacy schema detected, creating safety backup before import...");
    backup_before_migration(conn)?;

    let tx = conn.unchecked_transaction()?;
    let now = to_db_timestamp(Utc::now());

    // 1) Cars → vehicles
    let cars = load_legacy_cars(&tx)?;
    for car in &cars {
        insert_legacy_car(&tx, car, &now)?;
    }

    // 2) WorkSessions → work_sessions
    let mut imported = 0usize;
    let mut skipped = 0usize;
    if table_exists(&tx, "WorkSessions")? {
        for s in load_legacy_sessions(&tx)? {
            if insert_legacy_session(&tx, &s)? {
                imported += 1;
            } else {
                warning(format!("Skipping legacy session #{}: incomplete row", s.id));
                skipped += 1;
            }
        }
    }

    let message = format!(
        "Imported {} vehicles and {} work sessions from legacy tables ({} skipped)",
        cars.len(),
        imported,
        skipped
    );
    mark_applied(&tx, IMPORT_LEGACY_TABLES, &message)?;
    tx.commit()?;
    success(message);

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invocata da db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Create the data tables if missing
    if !table_exists(conn, "vehicles")? {
        create_vehicles_table(conn)?;
        success("Created vehicles table.");
    }
    if !table_exists(conn, "work_sessions")? {
        create_work_sessions_table(conn)?;
        success("Created work_sessions table.");
    }

    // 3) Versioned migrations, in order
    migrate_import_legacy_tables(conn)?;
    migrate_open_session_guard(conn)?;

    Ok(())
}
