//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Telegram bot token. Telegram is disabled when unset.
    pub telegram_token: Option<SecretString>,
    /// SQLite database file.
    pub db_path: PathBuf,
    pub http_host: String,
    pub http_port: u16,
    /// Public dashboard URL opened by the bot's web-app button.
    pub dashboard_url: String,
    /// Insert demo vehicles when the fleet is empty.
    pub seed_demo: bool,
    /// Abandon a registration dialog after this much inactivity.
    pub dialog_timeout: Option<Duration>,
    /// Read operator commands from stdin.
    pub cli_enabled: bool,
    /// Directory for daily-rotated log files, in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            db_path: PathBuf::from("./data/fleet.db"),
            http_host: "0.0.0.0".to_string(),
            http_port: 8000,
            dashboard_url: "http://localhost:8000/dashboard".to_string(),
            seed_demo: true,
            dialog_timeout: None,
            cli_enabled: true,
            log_dir: None,
        }
    }
}

impl FleetConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let telegram_token = get("BOT_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .map(SecretString::from);

        let http_port = match get("FLEET_HTTP_PORT") {
            Some(v) => parse_value("FLEET_HTTP_PORT", &v)?,
            None => defaults.http_port,
        };

        let dashboard_url = get("FLEET_DASHBOARD_URL")
            .unwrap_or_else(|| format!("http://localhost:{http_port}/dashboard"));

        let dialog_timeout = match get("FLEET_DIALOG_TIMEOUT_SECS") {
            Some(v) => match parse_value::<u64>("FLEET_DIALOG_TIMEOUT_SECS", &v)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            telegram_token,
            db_path: get("FLEET_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            http_host: get("FLEET_HTTP_HOST").unwrap_or(defaults.http_host),
            http_port,
            dashboard_url,
            seed_demo: match get("FLEET_SEED_DEMO") {
                Some(v) => parse_bool("FLEET_SEED_DEMO", &v)?,
                None => defaults.seed_demo,
            },
            dialog_timeout,
            cli_enabled: match get("FLEET_CLI") {
                Some(v) => parse_bool("FLEET_CLI", &v)?,
                None => defaults.cli_enabled,
            },
            log_dir: get("FLEET_LOG_DIR").map(PathBuf::from),
        })
    }

    /// `host:port` for the HTTP listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{value:?}: {e}"),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value:?} is not a boolean"),
        }),
    }
}
