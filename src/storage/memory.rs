use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{StorageArea, StorageMap};
use crate::error::StorageError;

/// In-process storage area.
///
/// Holds data for the lifetime of the process (session storage). Failures can
/// be injected per operation and calls are counted, which is what the
/// fallback paths are tested with.
#[derive(Default)]
pub struct MemoryArea {
    data: Mutex<StorageMap>,
    last_set: Mutex<Option<StorageMap>>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StorageMap) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Copy of everything currently stored
    pub fn snapshot(&self) -> StorageMap {
        self.data.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Payload of the most recent `set`, successful or not
    pub fn last_set(&self) -> Option<StorageMap> {
        self.last_set.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl StorageArea for MemoryArea {
    async fn get(&self, keys: &StorageMap) -> Result<StorageMap, StorageError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StorageError::Host("injected get failure".into()));
        }
        let data = self
            .data
            .lock()
            .map_err(|_| StorageError::Host("memory area lock poisoned".into()))?;
        Ok(keys
            .keys()
            .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, values: &StorageMap) -> Result<(), StorageError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_set.lock() {
            *last = Some(values.clone());
        }
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(StorageError::Host("injected set failure".into()));
        }
        let mut data = self
            .data
            .lock()
            .map_err(|_| StorageError::Host("memory area lock poisoned".into()))?;
        for (k, v) in values {
            data.insert(k.clone(), v.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_returns_only_present_keys() {
        let mut data = StorageMap::new();
        data.insert("skipKey".into(), json!("Ctrl"));
        data.insert("unrelated".into(), json!(1));
        let area = MemoryArea::with_data(data);

        let found = area.get(&crate::settings::default_keys()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.get("skipKey"), Some(&json!("Ctrl")));
    }

    #[tokio::test]
    async fn set_merges_into_existing() {
        let mut data = StorageMap::new();
        data.insert("unrelated".into(), json!(1));
        let area = MemoryArea::with_data(data);

        let mut values = StorageMap::new();
        values.insert("holdToSend".into(), json!(true));
        area.set(&values).await.unwrap();

        let snap = area.snapshot();
        assert_eq!(snap.get("unrelated"), Some(&json!(1)));
        assert_eq!(snap.get("holdToSend"), Some(&json!(true)));
    }
}
