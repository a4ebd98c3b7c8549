//! Runtime configuration, read from environment variables (and a `.env` file, if present).

use crate::error::{AppError, Result};
use crate::fetcher::RetryPolicy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.waqi.info";
/// WAQI's public demo token. Rate limited; set `WAQI_TOKEN` for real use.
pub const DEFAULT_TOKEN: &str = "demo";
pub const DEFAULT_STORE_PATH: &str = "aqi-monitor-store.json";
/// Cached readings younger than this are served without a network call.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Which key-value backend to persist state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            other => Err(AppError::Config(format!(
                "AQI_STORE must be one of file, memory, postgres (got {:?})",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub waqi_token: String,
    pub waqi_base_url: String,
    pub store: StoreKind,
    pub store_path: PathBuf,
    pub database_url: Option<String>,
    pub retry: RetryPolicy,
    pub cache_ttl: Duration,
    /// Per-request HTTP timeout. `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            waqi_token: DEFAULT_TOKEN.to_string(),
            waqi_base_url: DEFAULT_BASE_URL.to_string(),
            store: StoreKind::File,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            database_url: None,
            retry: RetryPolicy::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Unset or empty values use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let max_attempts = match var("AQI_MAX_ATTEMPTS") {
            Some(v) => parse_number::<u32>("AQI_MAX_ATTEMPTS", &v)?,
            None => defaults.retry.max_attempts,
        };
        if max_attempts == 0 {
            return Err(AppError::Config(
                "AQI_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let base_delay = match var("AQI_BACKOFF_BASE_SECS") {
            Some(v) => Duration::from_secs(parse_number("AQI_BACKOFF_BASE_SECS", &v)?),
            None => defaults.retry.base_delay,
        };
        let cache_ttl = match var("AQI_CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(parse_number("AQI_CACHE_TTL_SECS", &v)?),
            None => defaults.cache_ttl,
        };
        let http_timeout = var("AQI_HTTP_TIMEOUT_SECS")
            .map(|v| parse_number("AQI_HTTP_TIMEOUT_SECS", &v).map(Duration::from_secs))
            .transpose()?;
        let store = match var("AQI_STORE") {
            Some(v) => v.parse()?,
            None => defaults.store,
        };

        let config = Self {
            waqi_token: var("WAQI_TOKEN").unwrap_or(defaults.waqi_token),
            waqi_base_url: var("WAQI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.waqi_base_url),
            store,
            store_path: var("AQI_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            database_url: var("DATABASE_URL"),
            retry: RetryPolicy::new(max_attempts, base_delay),
            cache_ttl,
            http_timeout,
            log_dir: var("AQI_LOG_DIR").map(PathBuf::from),
        };
        Ok(config)
    }

    /// One-line description for the startup log. Leaves out the token and database URL.
    pub fn summary(&self) -> String {
        format!(
            "store={:?}, base_url={}, max_attempts={}, cache_ttl={:?}",
            self.store, self.waqi_base_url, self.retry.max_attempts, self.cache_ttl
        )
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        AppError::Config(format!(
            "{} must be a non-negative integer (got {:?})",
            key, value
        ))
    })
}
