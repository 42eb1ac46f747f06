use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::path::expand_tilde_str;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        let mut pool = DbPool::open(&cfg.database)?;
        BackupLogic::backup(
            &mut pool,
            &cfg.database,
            &expand_tilde_str(file),
            *compress,
            *force,
        )?;
    }

    Ok(())
}
