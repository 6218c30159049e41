use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Sample values for `JWT_SECRET` / `POLKA_KEY` that must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "your-jwt-secret", "your-polka-key", "secret"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    #[error("{0} is still a placeholder value")]
    Placeholder(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub polka_key: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub io_timeout: Duration,
    /// Reset the document on startup.
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::Placeholder("JWT_SECRET"));
        }
        let polka_key = required(&lookup, "POLKA_KEY")?;
        if PLACEHOLDER_SECRETS.contains(&polka_key.as_str()) {
            return Err(ConfigError::Placeholder("POLKA_KEY"));
        }

        let db_path = lookup("CHIRPY_DB_PATH")
            .unwrap_or_else(|| "database.json".into())
            .into();
        let host = lookup("CHIRPY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parsed(&lookup, "CHIRPY_PORT", 8080)?;
        let io_timeout = Duration::from_millis(parsed(&lookup, "CHIRPY_IO_TIMEOUT_MS", 5000)?);
        let debug = match lookup("CHIRPY_DEBUG").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "CHIRPY_DEBUG",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            jwt_secret,
            polka_key,
            db_path,
            host,
            port,
            io_timeout,
            debug,
        })
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
