//! Defines the data structures and models used throughout the application.
//!
//! This includes the WAQI API payloads, the normalized reading and its cache
//! entry, and the AQI health categories used for display.

mod aqi;
mod waqi;

pub use aqi::*;
pub use waqi::*;
