//! US EPA style AQI categories used to label and color a reading.

/// Health category of an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiLevel {
    /// Maps an AQI value to its category.
    ///
    /// Negative values land in `Moderate`: only `0..=50` counts as good.
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            0..=50 => Self::Good,
            i64::MIN..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Category color as a `#RRGGBB` hex string.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Good => "#00A651",
            Self::Moderate => "#FFF200",
            Self::UnhealthyForSensitiveGroups => "#F7941D",
            Self::Unhealthy => "#ED1C24",
            Self::VeryUnhealthy => "#662D91",
            Self::Hazardous => "#800000",
        }
    }
}
