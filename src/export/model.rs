// src/export/model.rs

use crate::models::vehicle::Vehicle;
use crate::models::work_session::WorkSession;
use crate::utils::time::to_db_timestamp;
use serde::Serialize;
use std::collections::HashMap;

/// Struttura “piatta” per export delle sessioni di lavoro.
#[derive(Serialize, Clone, Debug)]
pub struct SessionExport {
    pub id: i64,
    pub car_id: i64,
    pub car: String,
    pub operator: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: Option<i64>,
}

impl SessionExport {
    /// `car` is empty for sessions whose vehicle no longer exists.
    pub fn from_session(s: &WorkSession, vehicles: &HashMap<i64, Vehicle>) -> Self {
        Self {
            id: s.id,
            car_id: s.vehicle_id,
            car: vehicles
                .get(&s.vehicle_id)
                .map(Vehicle::display_name)
                .unwrap_or_default(),
            operator: s.operator_name.clone(),
            start_time: to_db_timestamp(s.start_time),
            end_time: s.end_time.map(to_db_timestamp).unwrap_or_default(),
            duration_minutes: s.duration_minutes,
        }
    }
}
