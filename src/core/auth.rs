//! Access control gate.
//!
//! Resolves who is calling and rejects the call before any business logic
//! runs. There is no password check here: the identity is whatever the
//! command line, the environment or the config file declare.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::identity::{Identity, Role};

pub const USER_ENV: &str = "OFFICINA_USER";

/// Build the caller identity from the highest-priority source available:
/// `--user` flag, then `OFFICINA_USER`, then the `user` config key.
pub fn resolve_identity(
    cli_user: Option<&str>,
    cli_role: Option<Role>,
    cfg: &Config,
) -> Option<Identity> {
    let username = cli_user
        .map(str::to_string)
        .or_else(|| std::env::var(USER_ENV).ok())
        .or_else(|| cfg.user.clone())?;

    let username = username.trim();
    if username.is_empty() {
        return None;
    }

    Some(Identity::new(username, cli_role.unwrap_or(cfg.role)))
}

/// The caller must be identified.
pub fn require_identity(who: Option<&Identity>) -> AppResult<&Identity> {
    match who {
        Some(id) if !id.username.trim().is_empty() => Ok(id),
        _ => Err(AppError::Unauthenticated),
    }
}

/// The caller must be identified and hold the admin role.
pub fn require_admin(who: Option<&Identity>) -> AppResult<&Identity> {
    let id = require_identity(who)?;
    if !id.is_admin() {
        return Err(AppError::Forbidden(format!(
            "'{}' is {}, admin required",
            id.username,
            id.role.as_str()
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identity_is_rejected() {
        let blank = Identity::new("  ", Role::Admin);
        assert!(matches!(
            require_identity(Some(&blank)),
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(require_identity(None), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn operator_is_not_admin() {
        let op = Identity::new("mario", Role::Operator);
        assert!(require_identity(Some(&op)).is_ok());
        assert!(matches!(require_admin(Some(&op)), Err(AppError::Forbidden(_))));

        let admin = Identity::new("alice", Role::Admin);
        assert!(require_admin(Some(&admin)).is_ok());
    }

    #[test]
    fn cli_user_wins_over_config() {
        let cfg = Config {
            user: Some("from-config".into()),
            role: Role::Admin,
            ..Config::default()
        };

        let id = resolve_identity(Some("from-cli"), None, &cfg).expect("identity");
        assert_eq!(id.username, "from-cli");
        assert_eq!(id.role, Role::Admin);

        let id = resolve_identity(Some("from-cli"), Some(Role::Operator), &cfg).expect("identity");
        assert_eq!(id.role, Role::Operator);

        assert!(resolve_identity(Some("   "), None, &cfg).is_none());
    }
}
