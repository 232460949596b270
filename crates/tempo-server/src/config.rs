//! Server configuration, read from the environment.
//!
//! Every setting except the JWT secret has a default; falling back to
//! one is logged so a misnamed variable is visible at start-up.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tempo_auth::AuthConfig;
use tempo_db::DbConfig;
use tempo_mail::DispatchConfig;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub mail: DispatchConfig,
}

impl Config {
    /// Load from process environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` as the variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();

        let jwt_secret = lookup("TEMPO_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("TEMPO_JWT_SECRET"))?;

        Ok(Self {
            port: parsed(&lookup, "TEMPO_PORT", 3000)?,
            db: DbConfig {
                url: string(&lookup, "TEMPO_DB_URL", db_defaults.url),
                namespace: string(&lookup, "TEMPO_DB_NAMESPACE", db_defaults.namespace),
                database: string(&lookup, "TEMPO_DB_DATABASE", db_defaults.database),
                username: string(&lookup, "TEMPO_DB_USER", db_defaults.username),
                password: string(&lookup, "TEMPO_DB_PASSWORD", db_defaults.password),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_issuer: string(&lookup, "TEMPO_JWT_ISSUER", auth_defaults.jwt_issuer),
                session_lifetime_secs: parsed(
                    &lookup,
                    "TEMPO_SESSION_LIFETIME_SECS",
                    auth_defaults.session_lifetime_secs,
                )?,
                pepper: lookup("TEMPO_PASSWORD_PEPPER").filter(|s| !s.is_empty()),
                min_password_length: parsed(
                    &lookup,
                    "TEMPO_MIN_PASSWORD_LENGTH",
                    auth_defaults.min_password_length,
                )?,
                store_timeout: Duration::from_millis(parsed(
                    &lookup,
                    "TEMPO_STORE_TIMEOUT_MS",
                    auth_defaults.store_timeout.as_millis() as u64,
                )?),
                ..auth_defaults
            },
            mail: DispatchConfig {
                capacity: parsed(
                    &lookup,
                    "TEMPO_MAIL_QUEUE_CAPACITY",
                    DispatchConfig::default().capacity,
                )?,
            },
        })
    }
}

fn string(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: String) -> String {
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default
    })
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[("TEMPO_JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.session_lifetime_secs, 86_400);
        assert_eq!(config.auth.store_timeout, Duration::from_secs(5));
        assert_eq!(config.mail.capacity, 200);
        assert_eq!(config.db.namespace, "tempo");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("TEMPO_JWT_SECRET", "s3cret"),
            ("TEMPO_PORT", "8080"),
            ("TEMPO_MAIL_QUEUE_CAPACITY", "16"),
            ("TEMPO_STORE_TIMEOUT_MS", "250"),
            ("TEMPO_DB_URL", "db:8000"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.mail.capacity, 16);
        assert_eq!(config.auth.store_timeout, Duration::from_millis(250));
        assert_eq!(config.db.url, "db:8000");
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TEMPO_JWT_SECRET")));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("TEMPO_JWT_SECRET", "s3cret"),
            ("TEMPO_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TEMPO_PORT", .. }));
    }
}
