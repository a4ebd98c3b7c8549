//! JSON-file backed key-value store.

use super::KeyValueStore;
use crate::error::CacheError;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persists all keys in one JSON object, e.g. `{"theme": "dark", "airData_..": "{...}"}`.
///
/// Every `set` rewrites the whole file; the app writes at most a few keys per run.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, CacheError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    // Starting over loses the stored keys, but the next `set` repairs the file.
                    warn!(
                        "Store file {} is unreadable, treating it as empty: {}",
                        self.path.display(),
                        e
                    );
                    Ok(BTreeMap::new())
                },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store file {} does not exist yet", self.path.display());
                Ok(BTreeMap::new())
            },
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(&entries)?;
        // Write a sibling file and rename it over the store, so readers never see half a file.
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!("Wrote key {} to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, LAST_COORDINATES_KEY};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() -> Result<(), CacheError> {
        let dir = tempdir()?;
        let store = FileStore::new(&dir.path().join("store.json"));

        assert_eq!(store.get("theme").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get_persists_across_instances() -> Result<(), CacheError> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("store.json");

        FileStore::new(&path).set("theme", "dark").await?;
        FileStore::new(&path).set("lastCoordinates", "{}").await?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("theme").await?.as_deref(), Some("dark"));
        assert_eq!(reopened.get("lastCoordinates").await?.as_deref(), Some("{}"));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() -> Result<(), CacheError> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json")?;

        assert_eq!(FileStore::new(&path).get("theme").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_truncated_file_is_repaired_by_next_set() -> Result<(), CacheError> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"theme": "da"#)?;
        let store = FileStore::new(&path);

        store.set("theme", "dark").await?;
        assert_eq!(store.get("theme").await?.as_deref(), Some("dark"));

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(on_disk.get("theme").map(String::as_str), Some("dark"));
        assert!(!store.tmp_path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_location_recovers_from_corrupt_store() -> Result<(), CacheError> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"theme": "da"#)?;
        let store = FileStore::new(&path);

        let first = crate::location::resolve_coordinates(&store).await;
        let second = crate::location::resolve_coordinates(&store).await;
        assert_eq!(first.ok(), Some(Coordinates::FALLBACK));
        assert_eq!(second.ok(), Some(Coordinates::FALLBACK));
        assert!(store.get(LAST_COORDINATES_KEY).await?.is_some());
        Ok(())
    }
}
