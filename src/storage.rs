//! Storage access with sync-then-local fallback.
//!
//! Hosts may expose a synced area, a local area, both or neither. Reads try
//! the synced area first and fall back to local; writes stop at the first
//! area that accepts them. Failures are logged and swallowed: a failed read
//! yields an empty mapping (defaults apply downstream) and a failed write
//! leaves nothing persisted.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::StorageError;

pub mod completion;
pub mod file_area;
pub mod host;
pub mod memory;

pub use completion::{CallbackArea, CallbackCompletion};
pub use file_area::JsonFileArea;
pub use host::{HostEnvironment, Namespace, StorageApi};
pub use memory::MemoryArea;

/// Flat key -> value mapping exchanged with storage areas
pub type StorageMap = serde_json::Map<String, serde_json::Value>;

/// A single storage backend using promise-style completion.
///
/// `get` returns only the keys that exist in the area; the values in `keys`
/// are defaults that tell the host which keys to fetch.
#[async_trait]
pub trait StorageArea: Send + Sync {
    async fn get(&self, keys: &StorageMap) -> Result<StorageMap, StorageError>;
    async fn set(&self, values: &StorageMap) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Sync,
    Local,
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaKind::Sync => f.write_str("sync"),
            AreaKind::Local => f.write_str("local"),
        }
    }
}

/// The two areas resolved from the host environment
#[derive(Clone, Default)]
pub struct SettingsStorage {
    sync: Option<Arc<dyn StorageArea>>,
    local: Option<Arc<dyn StorageArea>>,
}

impl SettingsStorage {
    pub fn new(
        sync: Option<Arc<dyn StorageArea>>,
        local: Option<Arc<dyn StorageArea>>,
    ) -> Self {
        Self { sync, local }
    }

    /// No area available; reads are empty and writes go nowhere
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn has_sync(&self) -> bool {
        self.sync.is_some()
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Read `keys`, preferring the synced area. Never fails.
    pub async fn get(&self, keys: &StorageMap) -> StorageMap {
        if let Some(sync) = &self.sync {
            match sync.get(keys).await {
                Ok(found) => return found,
                Err(e) => tracing::debug!("sync storage get failed, trying local: {}", e),
            }
        }
        if let Some(local) = &self.local {
            match local.get(keys).await {
                Ok(found) => return found,
                Err(e) => tracing::debug!("local storage get failed: {}", e),
            }
        }
        StorageMap::new()
    }

    /// Write `values` to the synced area, or to local when sync is missing or
    /// fails. Returns the area that accepted the write, if any.
    pub async fn set(&self, values: &StorageMap) -> Option<AreaKind> {
        if let Some(sync) = &self.sync {
            match sync.set(values).await {
                Ok(()) => return Some(AreaKind::Sync),
                Err(e) => tracing::debug!("sync storage set failed, trying local: {}", e),
            }
        }
        if let Some(local) = &self.local {
            match local.set(values).await {
                Ok(()) => return Some(AreaKind::Local),
                Err(e) => tracing::debug!("local storage set failed: {}", e),
            }
        }
        tracing::warn!("settings were not persisted: no storage area accepted the write");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StorageMap {
        let mut m = StorageMap::new();
        m.insert("skipKey".into(), json!("Alt"));
        m
    }

    fn keys() -> StorageMap {
        crate::settings::default_keys()
    }

    #[tokio::test]
    async fn get_prefers_sync() {
        let sync = Arc::new(MemoryArea::with_data(sample()));
        let local = Arc::new(MemoryArea::new());
        let storage = SettingsStorage::new(Some(sync.clone()), Some(local.clone()));

        assert_eq!(storage.get(&keys()).await, sample());
        assert_eq!(local.get_calls(), 0);
    }

    #[tokio::test]
    async fn get_falls_back_to_local_when_sync_fails() {
        let sync = Arc::new(MemoryArea::new());
        sync.fail_get(true);
        let local = Arc::new(MemoryArea::with_data(sample()));
        let storage = SettingsStorage::new(Some(sync.clone()), Some(local.clone()));

        assert_eq!(storage.get(&keys()).await, sample());
        assert_eq!(sync.get_calls(), 1);
        assert_eq!(local.get_calls(), 1);
    }

    #[tokio::test]
    async fn get_uses_local_when_sync_absent() {
        let local = Arc::new(MemoryArea::with_data(sample()));
        let storage = SettingsStorage::new(None, Some(local));
        assert_eq!(storage.get(&keys()).await, sample());
    }

    #[tokio::test]
    async fn get_without_areas_is_empty() {
        let storage = SettingsStorage::unavailable();
        assert!(storage.get(&keys()).await.is_empty());
    }

    #[tokio::test]
    async fn get_is_empty_when_both_fail() {
        let sync = Arc::new(MemoryArea::with_data(sample()));
        sync.fail_get(true);
        let local = Arc::new(MemoryArea::with_data(sample()));
        local.fail_get(true);
        let storage = SettingsStorage::new(Some(sync), Some(local));
        assert!(storage.get(&keys()).await.is_empty());
    }

    #[tokio::test]
    async fn set_stops_at_sync() {
        let sync = Arc::new(MemoryArea::new());
        let local = Arc::new(MemoryArea::new());
        let storage = SettingsStorage::new(Some(sync.clone()), Some(local.clone()));

        assert_eq!(storage.set(&sample()).await, Some(AreaKind::Sync));
        assert_eq!(sync.snapshot(), sample());
        assert_eq!(local.set_calls(), 0);
    }

    #[tokio::test]
    async fn set_falls_back_to_local_with_same_payload() {
        let sync = Arc::new(MemoryArea::new());
        sync.fail_set(true);
        let local = Arc::new(MemoryArea::new());
        let storage = SettingsStorage::new(Some(sync.clone()), Some(local.clone()));

        assert_eq!(storage.set(&sample()).await, Some(AreaKind::Local));
        assert_eq!(local.last_set(), Some(sample()));
        assert!(sync.snapshot().is_empty());
    }

    #[tokio::test]
    async fn set_uses_local_when_sync_absent() {
        let local = Arc::new(MemoryArea::new());
        let storage = SettingsStorage::new(None, Some(local.clone()));
        assert_eq!(storage.set(&sample()).await, Some(AreaKind::Local));
        assert_eq!(local.last_set(), Some(sample()));
    }

    #[tokio::test]
    async fn set_without_areas_persists_nothing() {
        let storage = SettingsStorage::unavailable();
        assert_eq!(storage.set(&sample()).await, None);
    }

    #[tokio::test]
    async fn set_swallows_double_failure() {
        let sync = Arc::new(MemoryArea::new());
        sync.fail_set(true);
        let local = Arc::new(MemoryArea::new());
        local.fail_set(true);
        let storage = SettingsStorage::new(Some(sync), Some(local.clone()));
        assert_eq!(storage.set(&sample()).await, None);
        assert_eq!(local.set_calls(), 1);
    }
}
