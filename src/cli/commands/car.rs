use crate::cli::parser::{CarCommand, Cli, Commands};
use crate::config::Config;
use crate::core::auth::{require_admin, require_identity, resolve_identity};
use crate::core::tracker::SessionTracker;
use crate::core::vehicles::VehicleLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::vehicle::{NewVehicle, VehicleFilter, VehiclePatch};
use crate::ui::messages::{confirm, info, success};
use crate::ui::render;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Car { action } = &cli.command else {
        return Ok(());
    };

    let who = resolve_identity(cli.user.as_deref(), cli.role, cfg);
    let who = who.as_ref();

    // Nessun accesso al DB senza identità (e senza ruolo admin per `del`)
    match action {
        CarCommand::Del { .. } => require_admin(who)?,
        _ => require_identity(who)?,
    };

    let mut pool = DbPool::open(&cfg.database)?;
    let logic = VehicleLogic::default();

    match action {
        CarCommand::Add {
            model,
            plate,
            lavorazioni,
            note,
            photo,
            partial_hours,
        } => {
            let v = logic.create(
                &mut pool,
                who,
                NewVehicle {
                    model: model.clone(),
                    plate: plate.clone(),
                    status: None,
                    lavorazioni: lavorazioni.clone(),
                    note: note.clone(),
                    photo: *photo,
                    partial_hours: partial_hours.clone(),
                },
            )?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                success(format!("Car #{} added: {}", v.id, v.display_name()));
            }
        }

        CarCommand::List { archive, all } => {
            let filter = if *all {
                VehicleFilter::All
            } else if *archive {
                VehicleFilter::Archive
            } else {
                VehicleFilter::Workshop
            };

            let list = logic.list(&mut pool, who, filter)?;

            if cli.json {
                render::print_vehicles_json(&list)?;
            } else if list.is_empty() {
                info("No cars found.");
            } else {
                println!("{}", render::vehicle_table(&list, cfg.separator()).render());
            }
        }

        CarCommand::Show { id } => {
            let v = logic.get(&mut pool, who, *id)?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                render::print_vehicle_detail(&v);

                let history = SessionTracker::default().by_vehicle(&mut pool, who, *id)?;
                println!();
                if history.is_empty() {
                    info("No work sessions yet.");
                } else {
                    println!("{}", render::session_table(&history, cfg.separator()).render());
                }
            }
        }

        CarCommand::Edit {
            id,
            model,
            plate,
            status,
            lavorazioni,
            note,
            photo,
            partial_hours,
            total_hours,
        } => {
            let patch = VehiclePatch {
                model: model.clone(),
                plate: plate.clone(),
                status: *status,
                lavorazioni: lavorazioni.clone(),
                note: note.clone(),
                photo: *photo,
                partial_hours: partial_hours.clone(),
                total_hours: total_hours.clone(),
            };

            let v = logic.update(&mut pool, who, *id, &patch)?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                success(format!("Car #{} updated.", v.id));
            }
        }

        CarCommand::Complete { id } => {
            let v = logic.complete(&mut pool, who, *id)?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                success(format!("Car #{} {} moved to the archive.", v.id, v.display_name()));
            }
        }

        CarCommand::Restore { id } => {
            let v = logic.restore(&mut pool, who, *id)?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                success(format!("Car #{} {} is back in the workshop.", v.id, v.display_name()));
            }
        }

        CarCommand::Del { id, yes } => {
            if !*yes
                && !cli.json
                && !confirm(&format!(
                    "Delete car #{} (on_vehicle_delete = {:?})?",
                    id, cfg.on_vehicle_delete
                ))
            {
                info("Nothing deleted.");
                return Ok(());
            }

            let v = logic.delete(&mut pool, who, *id, cfg.on_vehicle_delete)?;

            if cli.json {
                render::print_vehicle_json(&v)?;
            } else {
                success(format!("Car #{} {} deleted.", v.id, v.display_name()));
            }
        }

        CarCommand::Hours { id } => {
            let total = logic.recompute_hours(&mut pool, who, *id)?;

            if cli.json {
                render::print_json(&serde_json::json!({ "carId": id, "totalHours": total }))?;
            } else {
                success(format!("Car #{} total hours: {}", id, total));
            }
        }
    }

    Ok(())
}
