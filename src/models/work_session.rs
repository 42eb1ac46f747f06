use chrono::{DateTime, Utc};
use serde::Serialize;

/// One timed interval of an operator working on a vehicle.
///
/// `end_time == None` means the session is still open.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: i64,
    #[serde(rename = "carId")]
    pub vehicle_id: i64,
    pub operator_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
}

impl WorkSession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
