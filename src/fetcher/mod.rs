//! The read-through cache and bounded retry loop in front of the air quality provider.

mod air_quality;
mod retry;

pub use air_quality::*;
pub use retry::*;
