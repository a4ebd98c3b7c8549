//! Resolves the single location the app reports on.

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::{Coordinates, LAST_COORDINATES_KEY};
use tracing::{error, info};

/// Returns the stored coordinates, or stores and returns the Bangkok fallback if there are none.
///
/// # Errors
///
/// `AppError::Cache` if the store cannot be read or written, `AppError::JsonParse`
/// if the stored value is not a coordinates document.
pub async fn resolve_coordinates<S: KeyValueStore>(store: &S) -> Result<Coordinates> {
    if let Some(raw) = store.get(LAST_COORDINATES_KEY).await? {
        let coordinates: Coordinates = serde_json::from_str(&raw).map_err(|e| {
            error!("Stored {} is not valid: {}", LAST_COORDINATES_KEY, e);
            e
        })?;
        return Ok(coordinates);
    }

    let fallback = Coordinates::FALLBACK;
    info!(
        "No stored location, using fallback ({}, {})",
        fallback.latitude, fallback.longitude
    );
    store
        .set(LAST_COORDINATES_KEY, &serde_json::to_string(&fallback)?)
        .await?;
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_fallback_is_persisted() -> Result<()> {
        let store = MemoryStore::new();

        let coordinates = resolve_coordinates(&store).await?;

        assert_eq!(coordinates, Coordinates::FALLBACK);
        let raw = store.get(LAST_COORDINATES_KEY).await?.expect("fallback stored");
        assert_eq!(raw, r#"{"latitude":13.7563,"longitude":100.5018}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_coordinates_win() -> Result<()> {
        let store = MemoryStore::new();
        store
            .set(LAST_COORDINATES_KEY, r#"{"latitude":52.37,"longitude":4.9}"#)
            .await?;

        let coordinates = resolve_coordinates(&store).await?;

        assert_eq!(coordinates, Coordinates::new(52.37, 4.9));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_coordinates_are_an_error() -> Result<()> {
        let store = MemoryStore::new();
        store.set(LAST_COORDINATES_KEY, "Bangkok").await?;

        let result = resolve_coordinates(&store).await;

        assert!(matches!(result, Err(AppError::JsonParse(_))));
        Ok(())
    }
}
