//! Work session tracker.
//!
//! Opens and closes the timed sessions of each operator on each vehicle and
//! keeps the vehicle's `total_hours` in line with its session history.
//!
//! Per (vehicle, operator):
//!
//! ```text
//! [no session] --start--> [open] --stop--> [closed]   (terminal)
//! [no session] --stop-->  [no session]                (no-op)
//! [open]       --start--> [open]                      (same session returned)
//! ```
//!
//! A closed session is never reopened; the next `start` creates a new row.

use crate::core::auth::require_identity;
use crate::core::clock::{Clock, SystemClock};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::{sessions, vehicles};
use crate::errors::{AppError, AppResult};
use crate::models::identity::Identity;
use crate::models::work_session::WorkSession;
use crate::utils::formatting::mins2hm;
use crate::utils::time::{truncate_to_millis, whole_minutes_between};
use rusqlite::TransactionBehavior;

pub struct SessionTracker<C: Clock = SystemClock> {
    clock: C,
}

impl Default for SessionTracker<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

fn check_vehicle_id(vehicle_id: i64) -> AppResult<()> {
    if vehicle_id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "invalid vehicle id: {}",
            vehicle_id
        )));
    }
    Ok(())
}

fn check_operator(operator: &str) -> AppResult<&str> {
    let op = operator.trim();
    if op.is_empty() {
        return Err(AppError::InvalidArgument(
            "operator name must not be empty".into(),
        ));
    }
    Ok(op)
}

impl<C: Clock> SessionTracker<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Open a session for (vehicle, operator), or return the one already open.
    ///
    /// Starting twice is not an error: the open session comes back unchanged.
    pub fn start(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        vehicle_id: i64,
        operator: &str,
    ) -> AppResult<WorkSession> {
        let caller = require_identity(who)?;
        check_vehicle_id(vehicle_id)?;
        let operator = check_operator(operator)?;

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !vehicles::vehicle_exists(&tx, vehicle_id)? {
            return Err(AppError::NotFound(format!("car #{}", vehicle_id)));
        }

        if let Some(open) = sessions::find_open(&tx, vehicle_id, operator)? {
            return Ok(open);
        }

        let now = truncate_to_millis(self.clock.now());
        let session = sessions::insert_session(&tx, vehicle_id, operator, now)?;

        ttlog(
            &tx,
            "session_start",
            &format!("car #{}", vehicle_id),
            &format!(
                "{} started session #{} (by {})",
                operator, session.id, caller.username
            ),
        )?;

        tx.commit()?;
        Ok(session)
    }

    /// Close the open session of (vehicle, operator) and roll the vehicle total up.
    ///
    /// Returns `None` when nothing was open, including when a concurrent stop
    /// closed the session between the lookup and the update.
    pub fn stop(
        &self,
        pool: &mut DbPool,
        who: Option<&Identity>,
        vehicle_id: i64,
        operator: &str,
    ) -> AppResult<Option<WorkSession>> {
        let caller = require_identity(who)?;
        check_vehicle_id(vehicle_id)?;
        let operator = check_operator(operator)?;

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(open) = sessions::find_open(&tx, vehicle_id, operator)? else {
            return Ok(None);
        };

        let end = truncate_to_millis(self.clock.now());
        let minutes = whole_minutes_between(open.start_time, end);

        if !sessions::close_if_open(&tx, open.id, end, minutes)? {
            return Ok(None);
        }

        // Totale su tutte le sessioni della macchina, ogni operatore
        let total = sessions::sum_minutes_for_vehicle(&tx, vehicle_id)?;
        let total_str = mins2hm(total);
        vehicles::set_total_hours(&tx, vehicle_id, &total_str, end)?;

        ttlog(
            &tx,
            "session_stop",
            &format!("car #{}", vehicle_id),
            &format!(
                "{} stopped session #{} after {} min, car total {} (by {})",
                operator, open.id, minutes, total_str, caller.username
            ),
        )?;

        tx.commit()?;

        Ok(Some(WorkSession {
            end_time: Some(end),
            duration_minutes: Some(minutes),
            ..open
        }))
    }

    /// Sessions of the vehicle still open, any operator.
    pub fn active(
        &self,
        pool: &DbPool,
        who: Option<&Identity>,
        vehicle_id: i64,
    ) -> AppResult<Vec<WorkSession>> {
        require_identity(who)?;
        check_vehicle_id(vehicle_id)?;
        Ok(sessions::list_open_for_vehicle(&pool.conn, vehicle_id)?)
    }

    /// Every session of the vehicle, most recent start first (ties: newest id first).
    pub fn by_vehicle(
        &self,
        pool: &DbPool,
        who: Option<&Identity>,
        vehicle_id: i64,
    ) -> AppResult<Vec<WorkSession>> {
        require_identity(who)?;
        check_vehicle_id(vehicle_id)?;
        Ok(sessions::list_for_vehicle(&pool.conn, vehicle_id)?)
    }
}
