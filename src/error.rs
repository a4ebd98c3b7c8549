//! Defines the application's error types and a convenience `Result` alias.
//!
//! - `FetchError`: why a single provider attempt failed. Every variant is retried.
//! - `CacheError`: local key-value store failures. Never fatal to a fetch.
//! - `AppError`: everything that can reach the CLI layer.
//!
//! Errors that do not implement `Clone` are wrapped in `Arc` so all three types stay cloneable.

use std::sync::Arc;
use thiserror::Error;

/// Failure of a single request to the air quality provider.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection refused, timeout, body read).
    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The provider answered with a non-2xx HTTP status.
    #[error("HTTP error! status: {0}")]
    BadStatus(u16),

    /// The payload status was not `"ok"`, or the data block was missing or malformed.
    #[error("Invalid data received from API: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(Arc::new(err))
    }
}

/// Failure of the local key-value store.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Store I/O error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Store encoding error: {0}")]
    Encoding(Arc<serde_json::Error>),

    #[error("Store database error: {0}")]
    Db(Arc<sqlx::Error>),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Encoding(Arc::new(err))
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::Db(Arc::new(err))
    }
}

/// The primary error enumeration for all application-specific errors.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Every retry attempt failed. Carries the error of the last attempt.
    #[error("Failed to fetch air quality data after {attempts} attempt(s): {last_error}")]
    FetchFailed {
        attempts: u32,
        #[source]
        last_error: FetchError,
    },

    /// Error building the HTTP client (`reqwest`).
    #[error("HTTP Client Error: {0}")]
    Http(Arc<reqwest::Error>),

    /// Error originating from the local store.
    #[error("Cache Error: {0}")]
    Cache(#[from] CacheError),

    /// Error during JSON parsing (`serde_json`).
    #[error("JSON Parsing Error: {0}")]
    JsonParse(Arc<serde_json::Error>),

    /// Invalid or missing configuration value.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error related to standard I/O operations.
    #[error("I/O Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Error originating from user interaction prompts (`dialoguer`).
    #[error("Dialoguer Error: {0}")]
    Dialoguer(Arc<dialoguer::Error>),

    /// Error related to progress spinner templating (`indicatif`).
    #[error("Progress Style Template Error: {0}")]
    Template(Arc<indicatif::style::TemplateError>),
}

/// A specialized `Result` type using the application's `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// --- From implementations ---

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(Arc::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Cache(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Dialoguer(Arc::new(err))
    }
}

impl From<indicatif::style::TemplateError> for AppError {
    fn from(err: indicatif::style::TemplateError) -> Self {
        AppError::Template(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::JsonParse(Arc::new(err))
    }
}
