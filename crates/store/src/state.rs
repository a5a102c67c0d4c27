use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state io failure at `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("state payload could not be encoded: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("state backend failure: {0}")]
    Backend(String),
}

/// The persistence seam: get/set a JSON value by a well-known key. The
/// conversation never depends on anything richer than this.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, Value>>,
}

#[async_trait::async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// One file per key under a data directory, written whole on every set.
/// Last-writer-wins is fine here: there is exactly one writer per session.
pub struct JsonFileStateStore {
    root: PathBuf,
}

impl JsonFileStateStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io { path: root.clone(), source })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted identifiers, not user input; keep them readable
        // on disk while staying path-safe.
        let name: String = key
            .chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' { ch } else { '_' })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait::async_trait]
impl StateStore for JsonFileStateStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec_pretty(&value)?;
        write_atomically(&path, &bytes).await
    }
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{InMemoryStateStore, JsonFileStateStore, StateStore};

    #[tokio::test]
    async fn in_memory_store_round_trip() {
        let store = InMemoryStateStore::default();
        assert_eq!(store.get("autobot.transcript").await.expect("get"), None);

        store.set("autobot.transcript", json!([1, 2, 3])).await.expect("set");
        assert_eq!(
            store.get("autobot.transcript").await.expect("get"),
            Some(json!([1, 2, 3]))
        );
    }

    #[tokio::test]
    async fn file_store_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStateStore::open(dir.path()).await.expect("open");

        assert_eq!(store.get("autobot.transcript").await.expect("get"), None);

        store.set("autobot.transcript", json!({"v": 1})).await.expect("set");
        store.set("autobot.transcript", json!({"v": 2})).await.expect("overwrite");

        let reopened = JsonFileStateStore::open(dir.path()).await.expect("reopen");
        assert_eq!(
            reopened.get("autobot.transcript").await.expect("get"),
            Some(json!({"v": 2}))
        );
    }

    #[tokio::test]
    async fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStateStore::open(dir.path()).await.expect("open");

        store.set("weird/key name", json!(true)).await.expect("set");
        assert_eq!(store.get("weird/key name").await.expect("get"), Some(json!(true)));
    }
}
