//! Light / dark / system theme preference and the palettes it resolves to.

use crate::db::KeyValueStore;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub const THEME_KEY: &str = "theme";

/// The user's theme preference, as persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    /// Follow the terminal's color scheme.
    #[default]
    System,
}

/// A concrete scheme to render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

impl Theme {
    /// Cycles light → dark → system → light.
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    /// `System` follows `system`, falling back to light when the scheme is unknown.
    pub fn resolve(self, system: Option<ColorScheme>) -> ColorScheme {
        match self {
            Theme::Light => ColorScheme::Light,
            Theme::Dark => ColorScheme::Dark,
            Theme::System => system.unwrap_or(ColorScheme::Light),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Reads the saved preference. Missing, unreadable or unknown values give `System`.
    pub async fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get(THEME_KEY).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring unknown saved theme {:?}", raw);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Error loading theme: {}", e);
                Theme::default()
            },
        }
    }

    /// Persists the preference. Failures are logged only.
    pub async fn save<S: KeyValueStore>(self, store: &S) {
        match store.set(THEME_KEY, self.as_str()).await {
            Ok(()) => debug!("Saved theme {}", self),
            Err(e) => warn!("Error saving theme: {}", e),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme {:?}", other)),
        }
    }
}

/// Reads the terminal's scheme from `COLORFGBG` (set by rxvt, Konsole, iTerm2 and others).
pub fn detect_system_scheme() -> Option<ColorScheme> {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| scheme_from_colorfgbg(&v))
}

/// `COLORFGBG` is `fg;bg` or `fg;default;bg`; the last field is the ANSI background color.
pub fn scheme_from_colorfgbg(value: &str) -> Option<ColorScheme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match bg {
        0..=6 | 8 => Some(ColorScheme::Dark),
        _ => Some(ColorScheme::Light),
    }
}

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Colors the renderer uses for one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Rgb,
    pub sub_text: Rgb,
    pub primary: Rgb,
    pub success: Rgb,
    pub warning: Rgb,
    pub error: Rgb,
}

impl Palette {
    pub fn for_scheme(scheme: ColorScheme) -> Self {
        // Text colors are picked for a light or dark terminal background.
        let (text, sub_text) = match scheme {
            ColorScheme::Light => (Rgb(0x00, 0x00, 0x00), Rgb(0x3C, 0x3C, 0x43)),
            ColorScheme::Dark => (Rgb(0xFF, 0xFF, 0xFF), Rgb(0xEB, 0xEB, 0xF5)),
        };
        Self {
            text,
            sub_text,
            primary: Rgb(0x00, 0x7A, 0xFF),
            success: Rgb(0x34, 0xC7, 0x59),
            warning: Rgb(0xFF, 0x95, 0x00),
            error: Rgb(0xFF, 0x3B, 0x30),
        }
    }
}
