//! Callback-style storage areas.
//!
//! Some hosts complete storage calls by invoking a callback and report
//! failure through a separate "last error" slot that is only meaningful while
//! that callback runs. [`CallbackCompletion`] folds that convention into the
//! async [`StorageArea`] contract so the fallback logic only sees one shape.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;

use super::{StorageArea, StorageMap};
use crate::error::StorageError;

pub type GetCompletion = Box<dyn FnOnce(StorageMap) + Send>;
pub type SetCompletion = Box<dyn FnOnce() + Send>;

pub trait CallbackArea: Send + Sync {
    /// Start a read. An `Err` return is a synchronous failure; otherwise
    /// `done` fires later with the keys that were found.
    fn get(&self, keys: &StorageMap, done: GetCompletion) -> Result<(), StorageError>;

    fn set(&self, values: &StorageMap, done: SetCompletion) -> Result<(), StorageError>;

    /// Error for the operation whose completion is currently running
    fn last_error(&self) -> Option<String>;
}

/// Adapter exposing a [`CallbackArea`] as a [`StorageArea`]
pub struct CallbackCompletion<A> {
    area: Arc<A>,
}

impl<A: CallbackArea + 'static> CallbackCompletion<A> {
    pub fn new(area: A) -> Self {
        Self {
            area: Arc::new(area),
        }
    }
}

#[async_trait]
impl<A: CallbackArea + 'static> StorageArea for CallbackCompletion<A> {
    async fn get(&self, keys: &StorageMap) -> Result<StorageMap, StorageError> {
        let (tx, rx) = oneshot::channel();
        let area = Arc::clone(&self.area);
        self.area.get(
            keys,
            Box::new(move |found| {
                // last_error is only valid inside the completion
                let outcome = match area.last_error() {
                    Some(msg) => Err(StorageError::Host(msg)),
                    None => Ok(found),
                };
                let _ = tx.send(outcome);
            }),
        )?;
        rx.await.map_err(|_| StorageError::Abandoned)?
    }

    async fn set(&self, values: &StorageMap) -> Result<(), StorageError> {
        let (tx, rx) = oneshot::channel();
        let area = Arc::clone(&self.area);
        self.area.set(
            values,
            Box::new(move || {
                let outcome = match area.last_error() {
                    Some(msg) => Err(StorageError::Host(msg)),
                    None => Ok(()),
                };
                let _ = tx.send(outcome);
            }),
        )?;
        rx.await.map_err(|_| StorageError::Abandoned)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Immediate,
        Deferred,
        LastError,
        Throw,
        Drop,
    }

    // Behaves like a callback host: sets last_error around the completion
    struct FakeCallbackArea {
        data: Mutex<StorageMap>,
        mode: Mode,
        last_error: Arc<Mutex<Option<String>>>,
    }

    impl FakeCallbackArea {
        fn new(mode: Mode) -> Self {
            let mut data = StorageMap::new();
            data.insert("skipKey".into(), json!("Alt"));
            Self {
                data: Mutex::new(data),
                mode,
                last_error: Arc::new(Mutex::new(None)),
            }
        }

        fn complete(&self, run: Box<dyn FnOnce() + Send>) -> Result<(), StorageError> {
            match self.mode {
                Mode::Throw => Err(StorageError::Host("thrown".into())),
                Mode::Drop => Ok(()),
                Mode::Immediate => {
                    run();
                    Ok(())
                }
                Mode::LastError => {
                    *self.last_error.lock().unwrap() = Some("quota exceeded".into());
                    run();
                    *self.last_error.lock().unwrap() = None;
                    Ok(())
                }
                Mode::Deferred => {
                    std::thread::spawn(run);
                    Ok(())
                }
            }
        }
    }

    impl CallbackArea for FakeCallbackArea {
        fn get(&self, keys: &StorageMap, done: GetCompletion) -> Result<(), StorageError> {
            let data = self.data.lock().unwrap();
            let found: StorageMap = keys
                .keys()
                .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
                .collect();
            self.complete(Box::new(move || done(found)))
        }

        fn set(&self, values: &StorageMap, done: SetCompletion) -> Result<(), StorageError> {
            if self.mode != Mode::LastError && self.mode != Mode::Throw {
                let mut data = self.data.lock().unwrap();
                for (k, v) in values {
                    data.insert(k.clone(), v.clone());
                }
            }
            self.complete(done)
        }

        fn last_error(&self) -> Option<String> {
            self.last_error.lock().unwrap().clone()
        }
    }

    fn keys() -> StorageMap {
        crate::settings::default_keys()
    }

    #[tokio::test]
    async fn immediate_and_deferred_callbacks_resolve() {
        for mode in [Mode::Immediate, Mode::Deferred] {
            let area = CallbackCompletion::new(FakeCallbackArea::new(mode));
            let found = area.get(&keys()).await.unwrap();
            assert_eq!(found.get("skipKey"), Some(&json!("Alt")));
            area.set(&StorageMap::new()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn last_error_rejects() {
        let area = CallbackCompletion::new(FakeCallbackArea::new(Mode::LastError));
        assert!(matches!(
            area.get(&keys()).await,
            Err(StorageError::Host(msg)) if msg == "quota exceeded"
        ));
        assert!(area.set(&StorageMap::new()).await.is_err());
    }

    #[tokio::test]
    async fn synchronous_error_rejects() {
        let area = CallbackCompletion::new(FakeCallbackArea::new(Mode::Throw));
        assert!(area.get(&keys()).await.is_err());
        assert!(area.set(&StorageMap::new()).await.is_err());
    }

    #[tokio::test]
    async fn dropped_completion_is_abandoned() {
        let area = CallbackCompletion::new(FakeCallbackArea::new(Mode::Drop));
        assert!(matches!(
            area.get(&keys()).await,
            Err(StorageError::Abandoned)
        ));
    }

    #[tokio::test]
    async fn failing_callback_sync_falls_back_to_callback_local() {
        use crate::storage::{AreaKind, HostEnvironment, Namespace, StorageApi};

        let api = StorageApi::new()
            .with_sync_callback(FakeCallbackArea::new(Mode::LastError))
            .with_local_callback(FakeCallbackArea::new(Mode::Deferred));
        let storage = HostEnvironment::new()
            .with_namespace(Namespace::Chrome, api)
            .storage();

        let found = storage.get(&keys()).await;
        assert_eq!(found.get("skipKey"), Some(&json!("Alt")));

        let payload = crate::settings::Settings::default().to_storage_map();
        assert_eq!(storage.set(&payload).await, Some(AreaKind::Local));
    }
}
