// src/config.rs
use crate::auth::PrincipalRegistry;
use crate::error::ConfigError;
use crate::security::LoginThrottle;
use chrono::Duration;
use dotenv::dotenv;
use log::info;
use std::env;
use std::path::PathBuf;

pub const PRINCIPALS_VAR: &str = "AGROSTOCK_PRINCIPALS";
pub const MAX_FAILED_LOGINS_VAR: &str = "AGROSTOCK_MAX_FAILED_LOGINS";
pub const LOCKOUT_SECS_VAR: &str = "AGROSTOCK_LOCKOUT_SECS";

const DEFAULT_MAX_FAILED_LOGINS: u64 = 5;
const DEFAULT_LOCKOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// JSON principal registry; the demo accounts are used when unset
    pub principals_file: Option<PathBuf>,
    /// 0 disables login throttling
    pub max_failed_logins: u64,
    pub lockout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            principals_file: None,
            max_failed_logins: DEFAULT_MAX_FAILED_LOGINS,
            lockout_secs: DEFAULT_LOCKOUT_SECS,
        }
    }
}

impl AuthConfig {
    /// Read configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let principals_file = lookup(PRINCIPALS_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(AuthConfig {
            principals_file,
            max_failed_logins: parse_number(
                MAX_FAILED_LOGINS_VAR,
                lookup(MAX_FAILED_LOGINS_VAR),
                DEFAULT_MAX_FAILED_LOGINS,
            )?,
            lockout_secs: parse_number(
                LOCKOUT_SECS_VAR,
                lookup(LOCKOUT_SECS_VAR),
                DEFAULT_LOCKOUT_SECS,
            )?,
        })
    }

    pub fn load_registry(&self) -> Result<PrincipalRegistry, ConfigError> {
        match &self.principals_file {
            Some(path) => PrincipalRegistry::load(path),
            None => {
                info!("No {} set, using demo accounts", PRINCIPALS_VAR);
                Ok(PrincipalRegistry::demo())
            }
        }
    }

    pub fn login_throttle(&self) -> LoginThrottle {
        // Clamp so the window always fits in a chrono duration.
        let secs = i64::try_from(self.lockout_secs).unwrap_or(i64::MAX / 1_000);
        let window = Duration::try_seconds(secs).unwrap_or_else(|| Duration::days(365));
        LoginThrottle::new(self.max_failed_logins, window)
    }
}

fn parse_number(name: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
            name,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AuthConfig::default());
        assert_eq!(config.load_registry().unwrap().len(), 3);
        assert!(config.login_throttle().is_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = AuthConfig::from_lookup(lookup(&[
            (PRINCIPALS_VAR, "/etc/agrostock/principals.json"),
            (MAX_FAILED_LOGINS_VAR, "0"),
            (LOCKOUT_SECS_VAR, " 60 "),
        ]))
        .unwrap();
        assert_eq!(
            config.principals_file,
            Some(PathBuf::from("/etc/agrostock/principals.json"))
        );
        assert_eq!(config.max_failed_logins, 0);
        assert_eq!(config.lockout_secs, 60);
        assert!(!config.login_throttle().is_enabled());
    }

    #[test]
    fn test_invalid_number() {
        let err = AuthConfig::from_lookup(lookup(&[(MAX_FAILED_LOGINS_VAR, "many")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name, value } if name == MAX_FAILED_LOGINS_VAR && value == "many"
        ));
    }

    #[test]
    fn test_missing_principals_file() {
        let config = AuthConfig {
            principals_file: Some(PathBuf::from("/nonexistent/agrostock/principals.json")),
            ..AuthConfig::default()
        };
        assert!(matches!(config.load_registry(), Err(ConfigError::Io(_))));
    }
}
