use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workflow state of a vehicle in the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    #[value(name = "in_progress")]
    InProgress,
    #[value(name = "completed")]
    Completed,
}

impl VehicleStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VehicleStatus::InProgress => "in_progress",
            VehicleStatus::Completed => "completed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(VehicleStatus::InProgress),
            "completed" => Some(VehicleStatus::Completed),
            _ => None,
        }
    }

    /// Label shown in tables.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::InProgress => "In lavorazione",
            VehicleStatus::Completed => "Completata",
        }
    }
}

/// Which slice of the vehicle table a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleFilter {
    /// Every vehicle.
    All,
    /// The workshop floor: anything not completed.
    Workshop,
    /// Completed vehicles only.
    Archive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: i64,                     // ⇔ vehicles.id (AUTOINCREMENT)
    pub model: String,               // ⇔ vehicles.model
    pub plate: String,               // ⇔ vehicles.plate
    pub status: VehicleStatus,       // ⇔ vehicles.status ('in_progress' | 'completed')
    pub lavorazioni: Option<String>, // ⇔ vehicles.lavorazioni (work description)
    pub note: Option<String>,        // ⇔ vehicles.note
    pub photo: bool,                 // ⇔ vehicles.photo (INT 0/1)
    pub partial_hours: Option<String>,
    pub total_hours: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.model, self.plate)
    }

    /// Apply a partial update in place. Returns true if anything changed.
    pub fn apply(&mut self, patch: &VehiclePatch) -> bool {
        let before = self.clone();

        if let Some(m) = &patch.model {
            self.model = m.clone();
        }
        if let Some(p) = &patch.plate {
            self.plate = p.clone();
        }
        if let Some(s) = patch.status {
            self.status = s;
        }
        if let Some(l) = &patch.lavorazioni {
            self.lavorazioni = Some(l.clone());
        }
        if let Some(n) = &patch.note {
            self.note = Some(n.clone());
        }
        if let Some(ph) = patch.photo {
            self.photo = ph;
        }
        if let Some(h) = &patch.partial_hours {
            self.partial_hours = Some(h.clone());
        }
        if let Some(h) = &patch.total_hours {
            self.total_hours = Some(h.clone());
        }

        *self != before
    }
}

/// Input for creating a vehicle.
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub model: String,
    pub plate: String,
    pub status: Option<VehicleStatus>,
    pub lavorazioni: Option<String>,
    pub note: Option<String>,
    pub photo: bool,
    pub partial_hours: Option<String>,
}

/// Partial update: `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub model: Option<String>,
    pub plate: Option<String>,
    pub status: Option<VehicleStatus>,
    pub lavorazioni: Option<String>,
    pub note: Option<String>,
    pub photo: Option<bool>,
    pub partial_hours: Option<String>,
    pub total_hours: Option<String>,
}

impl VehiclePatch {
    pub fn status(status: VehicleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.plate.is_none()
            && self.status.is_none()
            && self.lavorazioni.is_none()
            && self.note.is_none()
            && self.photo.is_none()
            && self.partial_hours.is_none()
            && self.total_hours.is_none()
    }
}

/// JSON shape of a vehicle, as the web front-end used to receive it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleApi {
    pub id: i64,
    pub name: String,
    pub model: String,
    pub plate: String,
    pub status: VehicleStatus,
    pub lavorazioni: Option<String>,
    pub note: Option<String>,
    pub partial_hours: Option<String>,
    pub total_hours: Option<String>,
    pub photo: bool,
}

impl From<&Vehicle> for VehicleApi {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id,
            name: v.display_name(),
            model: v.model.clone(),
            plate: v.plate.clone(),
            status: v.status,
            lavorazioni: v.lavorazioni.clone(),
            note: v.note.clone(),
            partial_hours: v.partial_hours.clone(),
            total_hours: v.total_hours.clone(),
            photo: v.photo,
        }
    }
}
