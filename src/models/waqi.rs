//! Defines data structures for the application.
//!
//! Includes structs for:
//! - Deserializing World Air Quality Index (WAQI) `/feed` responses.
//! - The normalized `AirQualityReading` shown to the user.
//! - `CacheEntry`, the JSON document persisted per location in the key-value store.

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Key under which the last used coordinates are persisted.
pub const LAST_COORDINATES_KEY: &str = "lastCoordinates";

/// Geographic coordinates of the monitored location.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Bangkok, used when no coordinates have been stored yet.
    pub const FALLBACK: Coordinates = Coordinates::new(13.7563, 100.5018);

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Store key of the cached reading for these coordinates, e.g. `airData_13.7563_100.5018`.
    ///
    /// `f64`'s `Display` prints the shortest round-trip form (`100` for `100.0`),
    /// so keys written by other clients of the same store line up.
    pub fn cache_key(&self) -> String {
        format!("airData_{}_{}", self.latitude, self.longitude)
    }
}

// --- WAQI API Response Structs ---

/// Top-level envelope of `GET /feed/geo:{lat};{lon}/`.
///
/// `data` is kept untyped until `status` is checked: on errors WAQI sends a
/// plain string there (e.g. `"Unknown station"`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaqiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl WaqiResponse {
    /// Validates the envelope and decodes the `data` block.
    pub fn into_feed(self) -> Result<FeedData, FetchError> {
        if self.status != "ok" {
            return Err(FetchError::InvalidPayload(format!(
                "status was {:?}",
                self.status
            )));
        }
        match self.data {
            None | Some(serde_json::Value::Null) => Err(FetchError::InvalidPayload(
                "missing data block".to_string(),
            )),
            Some(data) => serde_json::from_value(data)
                .map_err(|e| FetchError::InvalidPayload(format!("malformed data block: {}", e))),
        }
    }
}

/// The AQI field is a number for live stations and `"-"` when a station has no current value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AqiValue {
    Number(f64),
    Text(String),
}

impl AqiValue {
    pub fn as_index(&self) -> i64 {
        match self {
            AqiValue::Number(n) => n.round() as i64,
            AqiValue::Text(s) => s.trim().parse::<f64>().map(|n| n.round() as i64).unwrap_or(0),
        }
    }
}

/// The `data` block of a successful feed response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedData {
    #[serde(default)]
    pub aqi: Option<AqiValue>,
    #[serde(default)]
    pub idx: Option<i64>,
    #[serde(default)]
    pub city: Option<City>,
    #[serde(default)]
    pub iaqi: Iaqi,
    #[serde(default)]
    pub time: Option<FeedTime>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct City {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geo: Vec<f64>,
}

/// Individual readings. Stations only report what they measure, so every entry is optional.
///
/// An entry that is present but not `{"v": <number>}` (stations send `{"v": "-"}`)
/// decodes as `None` instead of failing the whole feed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Iaqi {
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub pm25: Option<IaqiValue>,
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub pm10: Option<IaqiValue>,
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub o3: Option<IaqiValue>,
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub no2: Option<IaqiValue>,
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub so2: Option<IaqiValue>,
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub co: Option<IaqiValue>,
    /// Temperature (°C).
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub t: Option<IaqiValue>,
    /// Relative humidity (%).
    #[serde(default, deserialize_with = "lenient_iaqi_value")]
    pub h: Option<IaqiValue>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct IaqiValue {
    pub v: f64,
}

fn lenient_iaqi_value<'de, D>(deserializer: D) -> Result<Option<IaqiValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(IaqiValue::deserialize(value).ok())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedTime {
    #[serde(default)]
    pub iso: Option<String>,
}

// --- Application Structs ---

/// A normalized air quality reading, as rendered and cached.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReading {
    pub aqi: i64,
    pub station: String,
    pub temperature: f64,
    pub humidity: f64,
    pub last_update: String,
}

impl AirQualityReading {
    /// Flattens a feed into a reading. Missing numeric fields become 0, missing strings empty.
    pub fn from_feed(feed: &FeedData) -> Self {
        Self {
            aqi: feed.aqi.as_ref().map(AqiValue::as_index).unwrap_or(0),
            station: feed
                .city
                .as_ref()
                .and_then(|c| c.name.clone())
                .unwrap_or_default(),
            temperature: feed.iaqi.t.map(|t| t.v).unwrap_or(0.0),
            humidity: feed.iaqi.h.map(|h| h.v).unwrap_or(0.0),
            last_update: feed
                .time
                .as_ref()
                .and_then(|t| t.iso.clone())
                .unwrap_or_default(),
        }
    }
}

/// A reading together with the moment it was fetched.
///
/// Persisted as `{"data": <reading>, "timestamp": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheEntry {
    #[serde(rename = "data")]
    pub reading: AirQualityReading,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(reading: AirQualityReading, fetched_at: DateTime<Utc>) -> Self {
        Self {
            reading,
            fetched_at,
        }
    }

    /// True while `now - fetched_at < ttl`.
    ///
    /// A timestamp in the future (clock moved backwards) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}
