// src/storage/local.rs

//! Local filesystem state store.
//!
//! Persists the full state map as pretty JSON in `inventory.json` under
//! the storage root. Writes go to a temp file first and land with a
//! rename, so a crash mid-write leaves the prior state intact.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{StateData, StateMap, StateStore};

const STATE_FILE: &str = "inventory.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStateStore {
    root_dir: PathBuf,
}

impl LocalStateStore {
    /// Create a new LocalStateStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load(&self) -> Result<StateMap> {
        match self.read_json::<StateData>(STATE_FILE).await? {
            Some(data) => Ok(data.regions),
            None => {
                log::info!("No {} found, starting fresh", STATE_FILE);
                Ok(StateMap::new())
            }
        }
    }

    async fn replace(&self, regions: &StateMap) -> Result<()> {
        let data = StateData::new(regions.clone());
        self.write_json(STATE_FILE, &data).await?;
        log::debug!("State replaced: {} regions persisted", data.region_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quantity, RawItem, Snapshot};
    use tempfile::TempDir;

    fn sample_state() -> StateMap {
        let mut state = StateMap::new();
        state.insert(
            "fid=1".to_string(),
            Snapshot::build(vec![
                RawItem::new("Widget", Quantity::Known(5)),
                RawItem::new("Mystery", Quantity::Unknown),
            ]),
        );
        state.insert(
            "fid=1&gid=2".to_string(),
            Snapshot::build(vec![RawItem::new("Gadget", Quantity::Known(2))]),
        );
        state
    }

    #[tokio::test]
    async fn test_fresh_install_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path());

        let state = store.load().await.unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_replace_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path());

        let state = sample_state();
        store.replace(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_replace_is_full_not_merge() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path());

        store.replace(&sample_state()).await.unwrap();

        let mut smaller = StateMap::new();
        smaller.insert(
            "fid=1".to_string(),
            Snapshot::build(vec![RawItem::new("Widget", Quantity::Known(3))]),
        );
        store.replace(&smaller).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.contains_key("fid=1&gid=2"));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path());

        store.replace(&sample_state()).await.unwrap();

        assert!(tmp.path().join(STATE_FILE).exists());
        assert!(!tmp.path().join("inventory.tmp").exists());
    }

    #[tokio::test]
    async fn test_creates_missing_root_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("deep/storage");
        let store = LocalStateStore::new(&nested);

        store.replace(&sample_state()).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_state_file_has_metadata_header() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStateStore::new(tmp.path());

        store.replace(&sample_state()).await.unwrap();

        let raw = tokio::fs::read_to_string(tmp.path().join(STATE_FILE))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["region_count"], 2);
        assert!(value["updated_at"].is_string());
        // Unknown quantities persist as null, not as a missing item
        assert!(value["regions"]["fid=1"]["Mystery"].is_null());
    }
}
