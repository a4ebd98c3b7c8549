//! Provides clients for the external air quality API.
//!
//! Includes:
//! - `AirQualityProvider`: the seam the fetcher retries against.
//! - `waqi`: client for the World Air Quality Index `/feed` endpoint.

mod waqi;
mod waqi_test;

pub use waqi::*;

use crate::error::FetchError;
use crate::models::{Coordinates, WaqiResponse};

/// A source of raw air quality feeds.
///
/// Implementations report transport and HTTP status failures; the payload's own
/// `status` field is checked by the caller.
#[allow(async_fn_in_trait)]
pub trait AirQualityProvider {
    async fn fetch_feed(&self, coordinates: Coordinates) -> Result<WaqiResponse, FetchError>;
}
