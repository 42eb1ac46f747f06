use crate::cli::parser::{Cli, Commands, SessionCommand};
use crate::config::Config;
use crate::core::auth::{require_identity, resolve_identity};
use crate::core::tracker::SessionTracker;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::ui::render;
use crate::utils::time::format_local;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Session { action } = &cli.command else {
        return Ok(());
    };

    let who = resolve_identity(cli.user.as_deref(), cli.role, cfg);
    let who = who.as_ref();
    require_identity(who)?;
    let mut pool = DbPool::open(&cfg.database)?;
    let tracker = SessionTracker::default();

    match action {
        SessionCommand::Start { car_id, operator } => {
            let s = tracker.start(&mut pool, who, *car_id, operator)?;

            if cli.json {
                render::print_json(&s)?;
            } else {
                success(format!(
                    "{} working on car #{} since {} (session #{})",
                    s.operator_name,
                    s.vehicle_id,
                    format_local(s.start_time),
                    s.id
                ));
            }
        }

        SessionCommand::Stop { car_id, operator } => {
            let closed = tracker.stop(&mut pool, who, *car_id, operator)?;

            match (closed, cli.json) {
                (Some(s), true) => render::print_json(&s)?,
                (None, true) => println!("null"),
                (Some(s), false) => success(format!(
                    "{} stopped on car #{} after {} min (session #{})",
                    s.operator_name,
                    s.vehicle_id,
                    s.duration_minutes.unwrap_or(0),
                    s.id
                )),
                (None, false) => info(format!(
                    "No open session for {} on car #{}.",
                    operator.trim(),
                    car_id
                )),
            }
        }

        SessionCommand::Active { car_id } => {
            let list = tracker.active(&mut pool, who, *car_id)?;

            if cli.json {
                render::print_json(&list)?;
            } else if list.is_empty() {
                info(format!("Nobody is working on car #{}.", car_id));
            } else {
                println!("{}", render::session_table(&list, cfg.separator()).render());
            }
        }

        SessionCommand::List { car_id } => {
            let list = tracker.by_vehicle(&mut pool, who, *car_id)?;

            if cli.json {
                render::print_json(&list)?;
            } else if list.is_empty() {
                info(format!("No work sessions for car #{}.", car_id));
            } else {
                println!("{}", render::session_table(&list, cfg.separator()).render());
            }
        }
    }

    Ok(())
}
