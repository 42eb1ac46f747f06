use crate::config::OnVehicleDelete;
use crate::core::auth::{require_admin, require_identity};
use crate::core::clock::{Clock, SystemClock};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::{sessions, vehicles};
use crate::errors::{AppError, AppResult};
use crate::models::identity::Identity;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleFilter, VehiclePatch, VehicleStatus};
use crate::utils::formatting::mins2hm;
use crate::utils::time::truncate_to_millis;
use rusqlite::Connection;

/// High-level business logic for the `car` commands.
pub struct VehicleLogic<C: Clock = SystemClock> {
    clock: C,
}

impl Default for VehicleLogic<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

fn required_text(field: &str, value: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(v.to_string())
}

fn load(conn: &Connection, id: i64) -> AppResult<Vehicle> {
    if id <= 0 {
        return Err(AppError::InvalidArgument(format!("invalid car id: {}", id)));
    }
    vehicles::find_vehicle(conn, id)?.ok_or_else(|| AppError::NotFound(format!("car #{}", id)))
}

impl<C: Clock> VehicleLogic<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn create(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        input: NewVehicle,
    ) -> AppResult<Vehicle> {
        let caller = require_identity(who)?;

        let model = required_text("model", &input.model)?;
        let plate = required_text("plate", &input.plate)?;
        let input = NewVehicle {
            model,
            plate,
            ..input
        };

        let now = truncate_to_millis(self.clock.now());
        let id = vehicles::insert_vehicle(&pool.conn, &input, now)?;

        ttlog(
            &pool.conn,
            "car_add",
            &format!("car #{}", id),
            &format!(
                "{} {} added by {}",
                input.model, input.plate, caller.username
            ),
        )?;

        load(&pool.conn, id)
    }

    pub fn get(&self, pool: &DbPool, who: Option<&Identity>, id: i64) -> AppResult<Vehicle> {
        require_identity(who)?;
        load(&pool.conn, id)
    }

    pub fn list(
        &self,
        pool: &DbPool,
        who: Option<&Identity>,
        filter: VehicleFilter,
    ) -> AppResult<Vec<Vehicle>> {
        require_identity(who)?;
        Ok(vehicles::list_vehicles(&pool.conn, filter)?)
    }

    /// Partial update. `total_hours` can be overwritten here too;
    /// `recompute_hours` puts it back in line with the sessions.
    pub fn update(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        id: i64,
        patch: &VehiclePatch,
    ) -> AppResult<Vehicle> {
        let caller = require_identity(who)?;

        if patch.is_empty() {
            return Err(AppError::InvalidArgument("nothing to update".into()));
        }
        let patch = VehiclePatch {
            model: patch
                .model
                .as_deref()
                .map(|m| required_text("model", m))
                .transpose()?,
            plate: patch
                .plate
                .as_deref()
                .map(|p| required_text("plate", p))
                .transpose()?,
            ..patch.clone()
        };

        // Lettura e scrittura nella stessa transazione: nessuna sovrascrittura
        // di `total_hours` chiuso da un'altra sessione nel frattempo
        let tx = pool
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut preview = load(&tx, id)?;
        if !preview.apply(&patch) {
            return Ok(preview);
        }

        vehicles::apply_patch(&tx, id, &patch, truncate_to_millis(self.clock.now()))?;
        let vehicle = load(&tx, id)?;

        ttlog(
            &tx,
            "car_edit",
            &format!("car #{}", id),
            &format!("{} updated by {}", vehicle.display_name(), caller.username),
        )?;

        tx.commit()?;
        Ok(vehicle)
    }

    /// Move the vehicle to the archive.
    pub fn complete(&self, pool: &mut DbPool, who: Option<&Identity>, id: i64) -> AppResult<Vehicle> {
        self.update(pool, who, id, &VehiclePatch::status(VehicleStatus::Completed))
    }

    /// Bring an archived vehicle back to the workshop.
    pub fn restore(&self, pool: &mut DbPool, who: Option<&Identity>, id: i64) -> AppResult<Vehicle> {
        self.update(pool, who, id, &VehiclePatch::status(VehicleStatus::InProgress))
    }

    /// Delete a vehicle (admin only), handling its sessions per `policy`.
    /// Returns the deleted vehicle.
    pub fn delete(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        id: i64,
        policy: OnVehicleDelete,
    ) -> AppResult<Vehicle> {
        let caller = require_admin(who)?;

        let tx = pool.conn.transaction()?;
        let vehicle = load(&tx, id)?;
        let linked = sessions::count_for_vehicle(&tx, id)?;

        let removed_sessions = match policy {
            OnVehicleDelete::Restrict if linked > 0 => {
                return Err(AppError::InvalidArgument(format!(
                    "car #{} has {} work sessions; delete refused (on_vehicle_delete = restrict)",
                    id, linked
                )));
            }
            OnVehicleDelete::Cascade => sessions::delete_for_vehicle(&tx, id)?,
            OnVehicleDelete::Restrict | OnVehicleDelete::Orphan => 0,
        };

        vehicles::delete_vehicle(&tx, id)?;

        ttlog(
            &tx,
            "car_del",
            &format!("car #{}", id),
            &format!(
                "{} deleted by {} ({} sessions removed, {} left)",
                vehicle.display_name(),
                caller.username,
                removed_sessions,
                linked as usize - removed_sessions
            ),
        )?;

        tx.commit()?;
        Ok(vehicle)
    }

    /// Worked minutes derived from the sessions, without touching the vehicle.
    pub fn worked_minutes(&self, pool: &DbPool, who: Option<&Identity>, id: i64) -> AppResult<i64> {
        require_identity(who)?;
        load(&pool.conn, id)?;
        Ok(sessions::sum_minutes_for_vehicle(&pool.conn, id)?)
    }

    /// Rewrite `total_hours` from the session history.
    pub fn recompute_hours(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        id: i64,
    ) -> AppResult<String> {
        let caller = require_identity(who)?;

        let tx = pool
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        load(&tx, id)?;

        let total = mins2hm(sessions::sum_minutes_for_vehicle(&tx, id)?);
        vehicles::set_total_hours(&tx, id, &total, truncate_to_millis(self.clock.now()))?;

        ttlog(
            &tx,
            "car_hours",
            &format!("car #{}", id),
            &format!("total recomputed as {} by {}", total, caller.username),
        )?;

        tx.commit()?;
        Ok(total)
    }
}
