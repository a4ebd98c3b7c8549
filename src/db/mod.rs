//! Provides the local key-value store the app persists its state in.
//!
//! The store holds three kinds of keys: `lastCoordinates`, `theme` and one
//! `airData_{lat}_{lon}` entry per location. Values are always strings (JSON
//! documents for structured data).
//!
//! Backends:
//! - `file`: a single JSON file on disk (default).
//! - `memory`: process-local, lost on exit.
//! - `postgres`: a `kv_store` table via `sqlx`.

mod file;
mod memory;
mod postgres;

pub use file::*;
pub use memory::*;
pub use postgres::*;

use crate::config::{Config, StoreKind};
use crate::error::{AppError, CacheError, Result};

/// String key-value persistence.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), CacheError>;
}

/// The backend selected at startup.
pub enum Store {
    File(FileStore),
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    /// Opens the backend named in the configuration.
    pub async fn open(config: &Config) -> Result<Self> {
        match config.store {
            StoreKind::File => Ok(Store::File(FileStore::new(&config.store_path))),
            StoreKind::Memory => Ok(Store::Memory(MemoryStore::new())),
            StoreKind::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::Config("DATABASE_URL must be set when AQI_STORE=postgres".to_string())
                })?;
                Ok(Store::Postgres(PgStore::connect(url).await?))
            },
        }
    }
}

impl KeyValueStore for Store {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
        match self {
            Store::File(s) => s.get(key).await,
            Store::Memory(s) => s.get(key).await,
            Store::Postgres(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), CacheError> {
        match self {
            Store::File(s) => s.set(key, value).await,
            Store::Memory(s) => s.set(key, value).await,
            Store::Postgres(s) => s.set(key, value).await,
        }
    }
}
