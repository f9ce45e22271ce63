use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::{StorageArea, StorageMap};
use crate::error::StorageError;

// Distinguishes temp files of writes in flight, across areas and processes
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Storage area persisted as a single JSON object on disk.
///
/// Writes are read-modify-write; they are serialized per area so overlapping
/// saves never merge into a stale snapshot or trip over each other's temp file.
pub struct JsonFileArea {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileArea {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `settings.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<StorageMap, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => Ok(serde_json::from_str(&s)?),
            // Nothing written yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StorageMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StorageArea for JsonFileArea {
    async fn get(&self, keys: &StorageMap) -> Result<StorageMap, StorageError> {
        let data = self.read_all().await?;
        Ok(keys
            .keys()
            .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, values: &StorageMap) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut data = match self.read_all().await {
            Ok(data) => data,
            Err(StorageError::Json(e)) => {
                tracing::warn!("replacing unreadable {}: {}", self.path.display(), e);
                StorageMap::new()
            }
            Err(e) => return Err(e),
        };
        for (k, v) in values {
            data.insert(k.clone(), v.clone());
        }
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Atomic-ish write: write to temp file then rename
        let tmp_path = self.path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = tokio::fs::write(&tmp_path, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
