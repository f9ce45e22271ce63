use std::sync::Arc;

use super::{CallbackArea, CallbackCompletion, SettingsStorage, StorageArea};

/// Global names under which a host may expose its storage API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Browser,
    Chrome,
}

impl Namespace {
    /// Lookup order when more than one namespace is present
    pub const PREFERENCE: [Namespace; 2] = [Namespace::Browser, Namespace::Chrome];
}

/// Storage API of one namespace: optional synced and local areas
#[derive(Clone, Default)]
pub struct StorageApi {
    sync: Option<Arc<dyn StorageArea>>,
    local: Option<Arc<dyn StorageArea>>,
}

impl StorageApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sync(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.sync = Some(area);
        self
    }

    pub fn with_local(mut self, area: Arc<dyn StorageArea>) -> Self {
        self.local = Some(area);
        self
    }

    pub fn with_sync_callback<A: CallbackArea + 'static>(self, area: A) -> Self {
        self.with_sync(Arc::new(CallbackCompletion::new(area)))
    }

    pub fn with_local_callback<A: CallbackArea + 'static>(self, area: A) -> Self {
        self.with_local(Arc::new(CallbackCompletion::new(area)))
    }
}

/// Capabilities the host environment exposes, looked up once at startup
#[derive(Clone, Default)]
pub struct HostEnvironment {
    browser: Option<StorageApi>,
    chrome: Option<StorageApi>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: Namespace, api: StorageApi) -> Self {
        match namespace {
            Namespace::Browser => self.browser = Some(api),
            Namespace::Chrome => self.chrome = Some(api),
        }
        self
    }

    fn api(&self, namespace: Namespace) -> Option<&StorageApi> {
        match namespace {
            Namespace::Browser => self.browser.as_ref(),
            Namespace::Chrome => self.chrome.as_ref(),
        }
    }

    /// First namespace present in preference order
    pub fn resolve(&self) -> Option<Namespace> {
        Namespace::PREFERENCE
            .into_iter()
            .find(|ns| self.api(*ns).is_some())
    }

    /// Storage areas of the preferred namespace. Without any namespace both
    /// areas are unavailable.
    pub fn storage(&self) -> SettingsStorage {
        match self.resolve().and_then(|ns| self.api(ns)) {
            Some(api) => {
                tracing::debug!(
                    "storage api resolved: sync={} local={}",
                    api.sync.is_some(),
                    api.local.is_some()
                );
                SettingsStorage::new(api.sync.clone(), api.local.clone())
            }
            None => {
                tracing::debug!("host exposes no storage api");
                SettingsStorage::unavailable()
            }
        }
    }
}
