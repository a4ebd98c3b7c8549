use super::RetryPolicy;
use crate::api::AirQualityProvider;
use crate::db::KeyValueStore;
use crate::error::{AppError, Result};
use crate::models::{AirQualityReading, CacheEntry, Coordinates};
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::Retry;
use tracing::{debug, error, info, warn};

/// Returns the current reading for a location, serving it from the store while fresh.
///
/// `fetch` takes `&mut self`, so a fetcher never has two requests in flight.
pub struct AirQualityFetcher<P, S> {
    provider: P,
    store: S,
    policy: RetryPolicy,
    ttl: Duration,
}

impl<P, S> AirQualityFetcher<P, S>
where
    P: AirQualityProvider,
    S: KeyValueStore,
{
    pub fn new(provider: P, store: S, policy: RetryPolicy, ttl: Duration) -> Self {
        Self {
            provider,
            store,
            policy,
            ttl,
        }
    }

    /// The store readings are cached in. Shared with location and theme persistence.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the reading for `coordinates`.
    ///
    /// A cached entry younger than the TTL is returned without touching the network.
    /// Otherwise the provider is called up to `policy.max_attempts` times, and the
    /// first good reading is cached and returned.
    ///
    /// # Errors
    ///
    /// `AppError::FetchFailed` when every attempt failed. The cache is left untouched.
    /// Store failures never surface here; they are logged and treated as a miss.
    pub async fn fetch(&mut self, coordinates: Coordinates) -> Result<AirQualityReading> {
        let key = coordinates.cache_key();

        if let Some(entry) = self.cached_entry(&key).await {
            if entry.is_fresh(Utc::now(), self.ttl) {
                info!("Serving cached reading for {}", key);
                return Ok(entry.reading);
            }
            debug!("Cached reading for {} is stale", key);
        }

        let reading = self.fetch_with_retry(coordinates).await?;
        self.write_entry(&key, &reading).await;
        Ok(reading)
    }

    async fn cached_entry(&self, key: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read for {} failed, treating as miss: {}", key, e);
                return None;
            },
        };
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Cached entry for {} is unreadable, treating as miss: {}", key, e);
                None
            },
        }
    }

    async fn write_entry(&self, key: &str, reading: &AirQualityReading) {
        let entry = CacheEntry::new(reading.clone(), Utc::now());
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not encode cache entry for {}: {}", key, e);
                return;
            },
        };
        if let Err(e) = self.store.set(key, &raw).await {
            warn!("Cache write for {} failed: {}", key, e);
        }
    }

    async fn fetch_with_retry(&self, coordinates: Coordinates) -> Result<AirQualityReading> {
        let provider = &self.provider;
        let max_attempts = self.policy.max_attempts;
        // Incremented once per call of the action, i.e. per attempt
        let attempt_count = AtomicU32::new(0);

        let result = Retry::spawn(self.policy.backoff(), || {
            let attempt = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
            debug!("Attempt {}/{}", attempt, max_attempts);

            async move {
                let outcome = provider
                    .fetch_feed(coordinates)
                    .await
                    .and_then(|response| response.into_feed());
                if let Err(e) = &outcome {
                    warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                }
                outcome
            }
        })
        .await;

        let attempts = attempt_count.load(Ordering::SeqCst);
        match result {
            Ok(feed) => Ok(AirQualityReading::from_feed(&feed)),
            Err(last_error) => {
                error!(
                    "Error fetching air data after {} attempt(s): {}",
                    attempts, last_error
                );
                Err(AppError::FetchFailed {
                    attempts,
                    last_error,
                })
            },
        }
    }
}
