// src/export/logic.rs

use crate::core::auth::require_identity;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::{sessions, vehicles};
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::{ExportFormat, SessionExport};
use crate::models::identity::Identity;
use crate::models::vehicle::VehicleFilter;
use crate::ui::messages::warning;
use std::collections::HashMap;
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export delle sessioni di lavoro.
    ///
    /// - `format`: csv | json
    /// - `file`: path del file di output
    /// - `car`: `None` per tutte le macchine, oppure l'id di una sola
    ///
    /// Returns the number of rows written.
    pub fn export(
        pool: &mut DbPool,
        who: Option<&Identity>,
        format: ExportFormat,
        file: &str,
        car: Option<i64>,
        force: bool,
    ) -> AppResult<usize> {
        let caller = require_identity(who)?;

        // 1️⃣ Load sessions
        let rows = match car {
            Some(id) => {
                if !vehicles::vehicle_exists(&pool.conn, id)? {
                    return Err(AppError::NotFound(format!("car #{}", id)));
                }
                sessions::list_for_vehicle(&pool.conn, id)?
            }
            None => sessions::list_all(&pool.conn)?,
        };

        if rows.is_empty() {
            warning("No work sessions to export.");
        }

        // 2️⃣ Flatten, resolving vehicle names
        let by_id: HashMap<_, _> = vehicles::list_vehicles(&pool.conn, VehicleFilter::All)?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let flat: Vec<SessionExport> = rows
            .iter()
            .map(|s| SessionExport::from_session(s, &by_id))
            .collect();

        // 3️⃣ Write
        let path = Path::new(file);
        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&flat, path)?,
            ExportFormat::Json => export_json(&flat, path)?,
        }

        ttlog(
            &pool.conn,
            "export",
            &path.to_string_lossy(),
            &format!(
                "{} sessions exported as {} by {}",
                flat.len(),
                format.as_str(),
                caller.username
            ),
        )?;

        Ok(flat.len())
    }
}
