//! Provides a client for the World Air Quality Index (WAQI) feed API.
//!
//! This module defines the `WaqiClient` struct, which fetches the feed of the
//! station nearest to a pair of coordinates.

use super::AirQualityProvider;
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::models::{Coordinates, WaqiResponse};
use reqwest::Client;
use tracing::{debug, error, info, warn};

/// An asynchronous client for `GET /feed/geo:{lat};{lon}/?token={token}`.
pub struct WaqiClient {
    client: Client,
    token: String,
    base_url: String,
}

impl WaqiClient {
    /// Creates a new `WaqiClient` from the application configuration.
    ///
    /// Applies `http_timeout` to every request when configured.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            token: config.waqi_token.clone(),
            base_url: config.waqi_base_url.clone(),
        })
    }

    /// Creates a new `WaqiClient` with a custom base URL and no timeout.
    ///
    /// This is primarily intended for testing purposes (e.g., using a mock server).
    #[cfg(test)]
    pub fn new_with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn feed_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/feed/geo:{};{}/",
            self.base_url, coordinates.latitude, coordinates.longitude
        )
    }
}

impl AirQualityProvider for WaqiClient {
    /// Issues a single request. No retries happen here.
    async fn fetch_feed(
        &self,
        coordinates: Coordinates,
    ) -> std::result::Result<WaqiResponse, FetchError> {
        let url = self.feed_url(coordinates);
        info!(
            "Fetching air quality for ({}, {})",
            coordinates.latitude, coordinates.longitude
        );

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("Error requesting {}: {}", url, e);
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {} failed with status {}", url, status);
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                warn!("Received 401/403. Check WAQI_TOKEN validity.");
            }
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            error!("Error reading response body from {}: {}", url, e);
            FetchError::from(e)
        })?;

        let payload: WaqiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Error parsing API response JSON: {}", e);
            FetchError::InvalidPayload(format!("response was not valid JSON: {}", e))
        })?;

        debug!("Received feed with status {:?}", payload.status);
        Ok(payload)
    }
}
