//! Engine configuration read from the environment.

use std::time::Duration;

const DEFAULT_DATABASE_PATH: &str = "dicetally.db";
const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_TALLY_DEBOUNCE_MS: u64 = 500;
const DEFAULT_TRACKER_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Runtime settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite file, created if missing
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
    /// Quiet period before a face tally is written to storage
    pub tally_debounce: Duration,
    /// Open trackers untouched for this long are flushed and closed
    pub tracker_idle_timeout: Duration,
    /// Comma-separated origins; `None` allows any origin
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            tally_debounce: Duration::from_millis(DEFAULT_TALLY_DEBOUNCE_MS),
            tracker_idle_timeout: Duration::from_secs(DEFAULT_TRACKER_IDLE_TIMEOUT_SECS),
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup. Unparseable numbers fall back to
    /// their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_port = non_empty("SERVER_PORT")
            .map(|raw| ("SERVER_PORT", raw))
            .or_else(|| non_empty("PORT").map(|raw| ("PORT", raw)))
            .map(|(key, raw)| parse_or(key, &raw, defaults.server_port))
            .unwrap_or(defaults.server_port);

        let tally_debounce = non_empty("TALLY_DEBOUNCE_MS")
            .map(|raw| parse_or("TALLY_DEBOUNCE_MS", &raw, DEFAULT_TALLY_DEBOUNCE_MS))
            .map(Duration::from_millis)
            .unwrap_or(defaults.tally_debounce);

        let tracker_idle_timeout = non_empty("TRACKER_IDLE_TIMEOUT_SECS")
            .map(|raw| {
                parse_or(
                    "TRACKER_IDLE_TIMEOUT_SECS",
                    &raw,
                    DEFAULT_TRACKER_IDLE_TIMEOUT_SECS,
                )
            })
            .filter(|&secs| {
                if secs == 0 {
                    tracing::warn!("TRACKER_IDLE_TIMEOUT_SECS must be positive, using default");
                }
                secs > 0
            })
            .map(Duration::from_secs)
            .unwrap_or(defaults.tracker_idle_timeout);

        Self {
            database_path: non_empty("DATABASE_PATH").unwrap_or(defaults.database_path),
            server_host: non_empty("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            tally_debounce,
            tracker_idle_timeout,
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = raw, %default, "Invalid numeric setting, using default");
            default
        }
    }
}
