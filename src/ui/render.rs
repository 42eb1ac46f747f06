//! Human and JSON rendering of vehicles and work sessions.

use crate::errors::AppResult;
use crate::models::vehicle::{Vehicle, VehicleApi};
use crate::models::work_session::WorkSession;
use crate::utils::colors::{RESET, color_for_status, colorize_open, colorize_optional};
use crate::utils::formatting::{duration_cell, opt_cell, yes_no};
use crate::utils::table::Table;
use crate::utils::time::{format_local, format_local_opt};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_vehicle_json(v: &Vehicle) -> AppResult<()> {
    print_json(&VehicleApi::from(v))
}

pub fn print_vehicles_json(list: &[Vehicle]) -> AppResult<()> {
    let api: Vec<VehicleApi> = list.iter().map(VehicleApi::from).collect();
    print_json(&api)
}

pub fn vehicle_table(list: &[Vehicle], separator: char) -> Table {
    let mut t = Table::new(&["ID", "Car", "Status", "Total", "Partial", "Photo"], separator);

    for v in list {
        t.add_row(vec![
            v.id.to_string(),
            v.display_name(),
            format!("{}{}{}", color_for_status(v.status), v.status.label(), RESET),
            colorize_optional(&opt_cell(&v.total_hours)),
            colorize_optional(&opt_cell(&v.partial_hours)),
            yes_no(v.photo).to_string(),
        ]);
    }

    t
}

pub fn session_table(list: &[WorkSession], separator: char) -> Table {
    let mut t = Table::new(&["ID", "Car", "Operator", "Start", "End", "Duration"], separator);

    for s in list {
        t.add_row(vec![
            s.id.to_string(),
            s.vehicle_id.to_string(),
            colorize_open(&s.operator_name, s.is_open()),
            format_local(s.start_time),
            colorize_optional(&format_local_opt(s.end_time)),
            colorize_optional(&duration_cell(s.duration_minutes)),
        ]);
    }

    t
}

pub fn print_vehicle_detail(v: &Vehicle) {
    println!("🚗 #{} {}", v.id, v.display_name());
    println!(
        "   Status      : {}{}{}",
        color_for_status(v.status),
        v.status.label(),
        RESET
    );
    println!("   Lavorazioni : {}", opt_cell(&v.lavorazioni));
    println!("   Note        : {}", opt_cell(&v.note));
    println!("   Photo       : {}", yes_no(v.photo));
    println!("   Partial     : {}", colorize_optional(&opt_cell(&v.partial_hours)));
    println!("   Total       : {}", colorize_optional(&opt_cell(&v.total_hours)));
    println!("   Updated     : {}", format_local(v.updated_at));
}
