//! PostgreSQL-backed key-value store using `sqlx`.
//!
//! Lets several machines share the same cached readings and preferences.
//! Also contains integration tests (requires the `integration-tests` feature).

use super::KeyValueStore;
use crate::error::{AppError, CacheError, Result};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::{debug, error, info};

/// Holds a `sqlx::Pool` over the database containing the `kv_store` table.
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Connects to PostgreSQL and makes sure the `kv_store` table exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` if the pool cannot be established or the schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to key-value database...");

        let pool = PgPoolOptions::new()
            .max_connections(2) // One fetch at a time; a second connection covers theme writes
            .connect(database_url)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                AppError::from(e)
            })?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Connected to key-value database successfully");
        Ok(store)
    }

    /// Creates the `kv_store` table. Idempotent.
    pub async fn init_schema(&self) -> std::result::Result<(), CacheError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("kv_store table ready");
        Ok(())
    }
}

impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        debug!("Upserted key {}", key);
        Ok(())
    }
}
