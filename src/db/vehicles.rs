//! Vehicle record store.

use crate::errors::AppError;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilter, VehiclePatch, VehicleStatus};
use crate::utils::time::{parse_db_timestamp, to_db_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const SELECT_VEHICLE: &str = "SELECT id, model, plate, status, lavorazioni, note, photo,
            partial_hours, total_hours, created_at, updated_at
     FROM vehicles";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_timestamp(&raw)
        .ok_or_else(|| conversion_error(idx, AppError::Other(format!("Invalid timestamp: {}", raw))))
}

pub fn map_row(row: &Row) -> Result<Vehicle> {
    let status_str: String = row.get("status")?;
    let status = VehicleStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(
            3,
            AppError::InvalidArgument(format!("Invalid status: {}", status_str)),
        )
    })?;

    Ok(Vehicle {
        id: row.get("id")?,
        model: row.get("model")?,
        plate: row.get("plate")?,
        status,
        lavorazioni: row.get("lavorazioni")?,
        note: row.get("note")?,
        photo: row.get::<_, i64>("photo")? == 1,
        partial_hours: row.get("partial_hours")?,
        total_hours: row.get("total_hours")?,
        created_at: timestamp_column(row, 9)?,
        updated_at: timestamp_column(row, 10)?,
    })
}

/// Insert a vehicle and return its new id.
pub fn insert_vehicle(conn: &Connection, v: &NewVehicle, now: DateTime<Utc>) -> Result<i64> {
    let ts = to_db_timestamp(now);
    conn.execute(
        "INSERT INTO vehicles (model, plate, status, lavorazioni, note, photo,
                               partial_hours, total_hours, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8)",
        params![
            v.model,
            v.plate,
            v.status.unwrap_or_default().to_db_str(),
            v.lavorazioni,
            v.note,
            if v.photo { 1 } else { 0 },
            v.partial_hours,
            ts,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_vehicle(conn: &Connection, id: i64) -> Result<Option<Vehicle>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_VEHICLE} WHERE id = ?1"))?;
    stmt.query_row([id], map_row).optional()
}

pub fn vehicle_exists(conn: &Connection, id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM vehicles WHERE id = ?1")?;
    stmt.exists([id])
}

pub fn list_vehicles(conn: &Connection, filter: VehicleFilter) -> Result<Vec<Vehicle>> {
    let sql = match filter {
        VehicleFilter::All => format!("{SELECT_VEHICLE} ORDER BY id ASC"),
        VehicleFilter::Workshop => {
            format!("{SELECT_VEHICLE} WHERE status <> 'completed' ORDER BY id ASC")
        }
        VehicleFilter::Archive => {
            format!("{SELECT_VEHICLE} WHERE status = 'completed' ORDER BY id ASC")
        }
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Write only the fields set in `patch`; columns left `None` keep
/// whatever is stored now.
pub fn apply_patch(
    conn: &Connection,
    id: i64,
    patch: &VehiclePatch,
    now: DateTime<Utc>,
) -> Result<usize> {
    conn.execute(
        "UPDATE vehicles
         SET model = COALESCE(?1, model),
             plate = COALESCE(?2, plate),
             status = COALESCE(?3, status),
             lavorazioni = COALESCE(?4, lavorazioni),
             note = COALESCE(?5, note),
             photo = COALESCE(?6, photo),
             partial_hours = COALESCE(?7, partial_hours),
             total_hours = COALESCE(?8, total_hours),
             updated_at = ?9
         WHERE id = ?10",
        params![
            patch.model,
            patch.plate,
            patch.status.map(|s| s.to_db_str()),
            patch.lavorazioni,
            patch.note,
            patch.photo.map(|p| if p { 1 } else { 0 }),
            patch.partial_hours,
            patch.total_hours,
            to_db_timestamp(now),
            id,
        ],
    )
}

/// Write the aggregated worked time onto the vehicle.
pub fn set_total_hours(
    conn: &Connection,
    id: i64,
    total_hours: &str,
    now: DateTime<Utc>,
) -> Result<usize> {
    conn.execute(
        "UPDATE vehicles SET total_hours = ?1, updated_at = ?2 WHERE id = ?3",
        params![total_hours, to_db_timestamp(now), id],
    )
}

pub fn delete_vehicle(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM vehicles WHERE id = ?1", [id])
}

/// (in progress, completed) counts.
pub fn count_by_status(conn: &Connection) -> Result<(i64, i64)> {
    conn.query_row(
        "SELECT
             COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0)
         FROM vehicles",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}
