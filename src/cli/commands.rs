use crate::api::{AirQualityProvider, WaqiClient};
use crate::config::Config;
use crate::db::{KeyValueStore, Store};
use crate::error::{AppError, Result};
use crate::fetcher::AirQualityFetcher;
use crate::location::resolve_coordinates;
use crate::models::{AirQualityReading, Coordinates};
use crate::ui::{self, detect_system_scheme, ColorScheme, Palette, Theme};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

/// Real-time air quality for your location, from the World Air Quality Index
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run a single command; without one, an interactive menu is shown
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Commands {
    /// Show the current air quality (served from cache for 5 minutes)
    Show,

    /// Set the theme, or cycle light → dark → system when no value is given
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::System => Theme::System,
        }
    }
}

/// Screen state after a load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Reading(AirQualityReading),
    /// A static, user-facing message. Details go to the log.
    Error(&'static str),
}

/// CLI application
pub struct App<P, S> {
    fetcher: AirQualityFetcher<P, S>,
    theme: Theme,
    system_scheme: Option<ColorScheme>,
    coordinates: Option<Coordinates>,
}

impl App<WaqiClient, Store> {
    /// Create the CLI application from configuration
    pub async fn new(config: &Config) -> Result<Self> {
        let store = Store::open(config).await?;
        let client = WaqiClient::new(config)?;
        let fetcher = AirQualityFetcher::new(client, store, config.retry, config.cache_ttl);
        Ok(App::with_fetcher(fetcher, detect_system_scheme()).await)
    }
}

impl<P, S> App<P, S>
where
    P: AirQualityProvider,
    S: KeyValueStore,
{
    /// Wraps an existing fetcher, loading the saved theme from its store.
    pub async fn with_fetcher(
        fetcher: AirQualityFetcher<P, S>,
        system_scheme: Option<ColorScheme>,
    ) -> Self {
        let theme = Theme::load(fetcher.store()).await;
        Self {
            fetcher,
            theme,
            system_scheme,
            coordinates: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Palette for the current theme.
    pub fn palette(&self) -> Palette {
        Palette::for_scheme(self.theme.resolve(self.system_scheme))
    }

    /// Run a single command
    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Show => {
                let screen = self.refresh_with_spinner().await?;
                self.render(&screen);
            },
            Commands::Theme { theme } => {
                let theme = match theme {
                    Some(arg) => self.set_theme(arg.into()).await,
                    None => self.toggle_theme().await,
                };
                println!(
                    "{} {}",
                    ui::paint("Theme set to", self.palette().sub_text),
                    ui::paint(theme.as_str(), self.palette().primary)
                );
            },
        }
        Ok(())
    }

    /// Resolves the location (once) and fetches the reading for it.
    ///
    /// Failures become an error screen; the cause is logged.
    pub async fn refresh(&mut self) -> Screen {
        let coordinates = match self.coordinates {
            Some(c) => c,
            None => match resolve_coordinates(self.fetcher.store()).await {
                Ok(c) => {
                    self.coordinates = Some(c);
                    c
                },
                Err(e) => {
                    error!("Error getting location: {}", e);
                    return Screen::Error(ui::LOCATION_ERROR_MESSAGE);
                },
            },
        };

        match self.fetcher.fetch(coordinates).await {
            Ok(reading) => {
                info!("AQI at {} is {}", reading.station, reading.aqi);
                Screen::Reading(reading)
            },
            Err(e @ AppError::FetchFailed { .. }) => {
                error!("Error fetching air data: {}", e);
                Screen::Error(ui::FETCH_ERROR_MESSAGE)
            },
            Err(e) => {
                error!("Unexpected error fetching air data: {}", e);
                Screen::Error(ui::FETCH_ERROR_MESSAGE)
            },
        }
    }

    /// `refresh` with a loading spinner on screen.
    pub async fn refresh_with_spinner(&mut self) -> Result<Screen> {
        let spinner = ui::loading_spinner(&self.palette())?;
        let screen = self.refresh().await;
        spinner.finish_and_clear();
        Ok(screen)
    }

    pub fn render(&self, screen: &Screen) {
        let palette = self.palette();
        match screen {
            Screen::Reading(reading) => ui::print_reading(reading, &palette),
            Screen::Error(message) => ui::print_error(message, &palette),
        }
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        theme.save(self.fetcher.store()).await;
        theme
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggle()).await
    }

    /// Forgets the resolved location so the next refresh reads it from the store again.
    pub fn reset_location(&mut self) {
        self.coordinates = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::FetchError;
    use crate::fetcher::RetryPolicy;
    use crate::models::{WaqiResponse, LAST_COORDINATES_KEY};
    use crate::ui::THEME_KEY;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // --- Mock Provider ---
    // Answers every request with the same body and records the coordinates asked for.
    #[derive(Clone)]
    struct FixedProvider {
        body: serde_json::Value,
        requested: Arc<Mutex<Vec<Coordinates>>>,
    }

    impl FixedProvider {
        fn new(body: serde_json::Value) -> Self {
            Self {
                body,
                requested: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl AirQualityProvider for FixedProvider {
        async fn fetch_feed(
            &self,
            coordinates: Coordinates,
        ) -> std::result::Result<WaqiResponse, FetchError> {
            self.requested.lock().unwrap().push(coordinates);
            Ok(serde_json::from_value(self.body.clone()).unwrap())
        }
    }

    async fn test_app(provider: FixedProvider, store: MemoryStore) -> App<FixedProvider, MemoryStore> {
        let fetcher = AirQualityFetcher::new(
            provider,
            store,
            RetryPolicy::new(2, Duration::from_millis(1)),
            Duration::from_secs(300),
        );
        App::with_fetcher(fetcher, None).await
    }

    #[tokio::test]
    async fn test_refresh_uses_fallback_location() {
        let provider = FixedProvider::new(json!({
            "status": "ok",
            "data": { "aqi": 42, "city": { "name": "Bangkok" } }
        }));
        let mut app = test_app(provider.clone(), MemoryStore::new()).await;

        let screen = app.refresh().await;

        match screen {
            Screen::Reading(reading) => {
                assert_eq!(reading.aqi, 42);
                assert_eq!(reading.station, "Bangkok");
            },
            other => panic!("expected a reading, got {:?}", other),
        }
        assert_eq!(
            provider.requested.lock().unwrap().as_slice(),
            &[Coordinates::FALLBACK]
        );
    }

    #[tokio::test]
    async fn test_refresh_uses_stored_location() {
        let provider = FixedProvider::new(json!({ "status": "ok", "data": { "aqi": 12 } }));
        let store = MemoryStore::new();
        store
            .set(LAST_COORDINATES_KEY, r#"{"latitude":52.37,"longitude":4.9}"#)
            .await
            .unwrap();
        let mut app = test_app(provider.clone(), store).await;

        app.refresh().await;

        assert_eq!(
            provider.requested.lock().unwrap().as_slice(),
            &[Coordinates::new(52.37, 4.9)]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_static_message() {
        let provider = FixedProvider::new(json!({ "status": "error", "data": "Invalid key" }));
        let mut app = test_app(provider, MemoryStore::new()).await;

        assert_eq!(app.refresh().await, Screen::Error(ui::FETCH_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_corrupt_location_shows_location_message() {
        let provider = FixedProvider::new(json!({ "status": "ok", "data": { "aqi": 1 } }));
        let store = MemoryStore::new();
        store.set(LAST_COORDINATES_KEY, "nowhere").await.unwrap();
        let mut app = test_app(provider.clone(), store).await;

        assert_eq!(app.refresh().await, Screen::Error(ui::LOCATION_ERROR_MESSAGE));
        assert!(provider.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_theme_toggle_is_persisted() {
        let provider = FixedProvider::new(json!({ "status": "ok", "data": {} }));
        let store = MemoryStore::new();
        store.set(THEME_KEY, "dark").await.unwrap();
        let mut app = test_app(provider, store).await;
        assert_eq!(app.theme(), Theme::Dark);

        assert_eq!(app.toggle_theme().await, Theme::System);
        assert_eq!(app.toggle_theme().await, Theme::Light);
        assert_eq!(
            app.fetcher.store().get(THEME_KEY).await.unwrap().as_deref(),
            Some("light")
        );
    }

    #[tokio::test]
    async fn test_theme_command_sets_explicit_value() -> Result<()> {
        let provider = FixedProvider::new(json!({ "status": "ok", "data": {} }));
        let mut app = test_app(provider, MemoryStore::new()).await;

        app.run_command(Commands::Theme {
            theme: Some(ThemeArg::Dark),
        })
        .await?;

        assert_eq!(app.theme(), Theme::Dark);
        assert_eq!(app.palette(), Palette::for_scheme(ColorScheme::Dark));
        Ok(())
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["aqi-monitor", "theme", "dark"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                theme: Some(ThemeArg::Dark)
            })
        ));

        let cli = Cli::try_parse_from(["aqi-monitor"]).unwrap();
        assert!(cli.command.is_none());
    }
}
