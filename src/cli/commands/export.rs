use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::auth::{require_identity, resolve_identity};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde_str;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        car,
        force,
    } = &cli.command
    {
        let who = resolve_identity(cli.user.as_deref(), cli.role, cfg);
        require_identity(who.as_ref())?;
        let mut pool = DbPool::open(&cfg.database)?;
        ExportLogic::export(
            &mut pool,
            who.as_ref(),
            *format,
            &expand_tilde_str(file),
            *car,
            *force,
        )?;
    }
    Ok(())
}
