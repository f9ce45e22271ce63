//! Options controller: keeps the form and stored settings in step.
//!
//! Persistence is best effort. Storage failures are recovered by
//! [`SettingsStorage`] and anything left over is logged, never shown.

use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{OptionsError, Result};
use crate::form::{Document, FormElements, CHANGE_IDS};
use crate::hint;
use crate::settings::{self, Settings};
use crate::storage::{AreaKind, SettingsStorage};

pub struct OptionsController {
    form: FormElements,
    storage: SettingsStorage,
    // Hint language preference (auto/en/ja)
    language: String,
    // Saves spawned by change handlers; never sequenced, last to finish wins
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl OptionsController {
    /// Resolve the form elements. A missing element is fatal.
    pub fn new(doc: &dyn Document, storage: SettingsStorage) -> Result<Self> {
        let form = FormElements::resolve(doc)?;
        Ok(Self {
            form,
            storage,
            language: "en".to_string(),
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Construct, bind change handlers and load once.
    pub async fn start(doc: &dyn Document, storage: SettingsStorage) -> Result<Arc<Self>> {
        Self::start_with_language(doc, storage, "en").await
    }

    pub async fn start_with_language(
        doc: &dyn Document,
        storage: SettingsStorage,
        language: &str,
    ) -> Result<Arc<Self>> {
        let controller = Arc::new(Self::new(doc, storage)?.with_language(language));
        controller.bind(doc)?;
        controller.load().await;
        Ok(controller)
    }

    /// Load stored settings into the form and refresh the hint.
    pub async fn load(&self) -> Settings {
        let found = self.storage.get(&settings::default_keys()).await;
        let loaded = settings::normalize(Some(&found));
        tracing::debug!("loaded settings: {:?}", loaded);
        self.form.write(&loaded);
        self.update_hint();
        loaded
    }

    /// Persist the current form state and refresh the hint.
    /// Returns the area that accepted the write, if any.
    pub async fn save(&self) -> Option<AreaKind> {
        let payload = self.form.read();
        let persisted = self.storage.set(&payload.to_storage_map()).await;
        match persisted {
            Some(area) => tracing::debug!("saved settings to {} storage", area),
            None => tracing::debug!("settings not saved"),
        }
        self.update_hint();
        persisted
    }

    /// Put the defaults back into the form and save them.
    pub async fn reset(&self) -> Option<AreaKind> {
        self.form.write(&Settings::default());
        self.save().await
    }

    pub fn update_hint(&self) {
        let text = hint::hint_text_in(
            &self.language,
            &self.form.skip_key(),
            self.form.hold_to_send(),
        );
        self.form.set_hint(&text);
    }

    /// Save on every change of the four setting controls.
    ///
    /// Each change spawns an independent save on the current tokio runtime.
    pub fn bind(self: &Arc<Self>, doc: &dyn Document) -> Result<()> {
        let handle = Handle::try_current().map_err(|_| OptionsError::NoRuntime)?;
        for id in CHANGE_IDS {
            let controller = Arc::clone(self);
            let handle = handle.clone();
            doc.on_change(
                id,
                Arc::new(move || {
                    let saver = Arc::clone(&controller);
                    let task = handle.spawn(async move {
                        saver.save().await;
                    });
                    controller.track(task);
                }),
            );
        }
        Ok(())
    }

    fn track(&self, task: JoinHandle<()>) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.retain(|t| !t.is_finished());
            in_flight.push(task);
        }
    }

    /// Wait for every save spawned so far.
    pub async fn flush(&self) {
        let pending: Vec<JoinHandle<()>> = match self.in_flight.lock() {
            Ok(mut in_flight) => in_flight.drain(..).collect(),
            Err(_) => return,
        };
        for task in pending {
            if let Err(e) = task.await {
                tracing::debug!("save task ended abnormally: {}", e);
            }
        }
    }
}
