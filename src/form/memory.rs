use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    ChangeHandler, Document, SelectControl, TextTarget, ToggleControl, ID_AUTO_EXPAND_CHATS,
    ID_AUTO_TEMP_CHAT, ID_HINT, ID_HOLD_TO_SEND, ID_SKIP_KEY,
};
use crate::settings;

#[derive(Default)]
struct MemorySelect {
    value: Mutex<String>,
}

impl SelectControl for MemorySelect {
    fn value(&self) -> String {
        self.value.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        if let Ok(mut v) = self.value.lock() {
            *v = value.to_string();
        }
    }
}

#[derive(Default)]
struct MemoryToggle {
    checked: AtomicBool,
}

impl ToggleControl for MemoryToggle {
    fn is_checked(&self) -> bool {
        self.checked.load(Ordering::SeqCst)
    }

    fn set_checked(&self, checked: bool) {
        self.checked.store(checked, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MemoryText {
    text: Mutex<String>,
}

impl TextTarget for MemoryText {
    fn set_text(&self, text: &str) {
        if let Ok(mut t) = self.text.lock() {
            *t = text.to_string();
        }
    }
}

enum MemoryElement {
    Select(Arc<MemorySelect>),
    Toggle(Arc<MemoryToggle>),
    Text(Arc<MemoryText>),
}

/// In-process document holding form controls by id.
///
/// User edits go through [`MemoryDocument::user_select`] and
/// [`MemoryDocument::user_toggle`], which update the control and then fire
/// its change handlers, like input events on a real page.
#[derive(Default)]
pub struct MemoryDocument {
    elements: HashMap<String, MemoryElement>,
    handlers: Mutex<HashMap<String, Vec<ChangeHandler>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The options page with its initial (pre-load) control states
    pub fn options_page() -> Self {
        Self::new()
            .with_text(ID_HINT, "")
            .with_select(ID_SKIP_KEY, settings::DEFAULT_SKIP_KEY)
            .with_toggle(ID_HOLD_TO_SEND, settings::DEFAULT_HOLD_TO_SEND)
            .with_toggle(ID_AUTO_EXPAND_CHATS, settings::DEFAULT_AUTO_EXPAND_CHATS)
            .with_toggle(ID_AUTO_TEMP_CHAT, settings::DEFAULT_AUTO_TEMP_CHAT)
    }

    pub fn with_select(mut self, id: &str, value: &str) -> Self {
        let select = MemorySelect::default();
        select.set_value(value);
        self.elements
            .insert(id.to_string(), MemoryElement::Select(Arc::new(select)));
        self
    }

    pub fn with_toggle(mut self, id: &str, checked: bool) -> Self {
        let toggle = MemoryToggle::default();
        toggle.set_checked(checked);
        self.elements
            .insert(id.to_string(), MemoryElement::Toggle(Arc::new(toggle)));
        self
    }

    pub fn with_text(mut self, id: &str, text: &str) -> Self {
        let target = MemoryText::default();
        target.set_text(text);
        self.elements
            .insert(id.to_string(), MemoryElement::Text(Arc::new(target)));
        self
    }

    pub fn without(mut self, id: &str) -> Self {
        self.elements.remove(id);
        self
    }

    pub fn select_value(&self, id: &str) -> Option<String> {
        match self.elements.get(id)? {
            MemoryElement::Select(s) => Some(s.value()),
            _ => None,
        }
    }

    pub fn is_checked(&self, id: &str) -> Option<bool> {
        match self.elements.get(id)? {
            MemoryElement::Toggle(t) => Some(t.is_checked()),
            _ => None,
        }
    }

    pub fn text(&self, id: &str) -> Option<String> {
        match self.elements.get(id)? {
            MemoryElement::Text(t) => t.text.lock().ok().map(|t| t.clone()),
            _ => None,
        }
    }

    /// Change a selector without firing change handlers
    pub fn set_select(&self, id: &str, value: &str) -> bool {
        match self.elements.get(id) {
            Some(MemoryElement::Select(s)) => {
                s.set_value(value);
                true
            }
            _ => false,
        }
    }

    /// Change a toggle without firing change handlers
    pub fn set_checked(&self, id: &str, checked: bool) -> bool {
        match self.elements.get(id) {
            Some(MemoryElement::Toggle(t)) => {
                t.set_checked(checked);
                true
            }
            _ => false,
        }
    }

    /// Select `value` as the user would; returns false when `id` is not a selector
    pub fn user_select(&self, id: &str, value: &str) -> bool {
        match self.elements.get(id) {
            Some(MemoryElement::Select(s)) => s.set_value(value),
            _ => return false,
        }
        self.fire_change(id);
        true
    }

    /// Toggle as the user would; returns false when `id` is not a toggle
    pub fn user_toggle(&self, id: &str, checked: bool) -> bool {
        match self.elements.get(id) {
            Some(MemoryElement::Toggle(t)) => t.set_checked(checked),
            _ => return false,
        }
        self.fire_change(id);
        true
    }

    fn fire_change(&self, id: &str) {
        // Run outside the lock so handlers may register further handlers
        let handlers: Vec<ChangeHandler> = self
            .handlers
            .lock()
            .ok()
            .and_then(|h| h.get(id).cloned())
            .unwrap_or_default();
        for handler in handlers {
            handler();
        }
    }
}

impl Document for MemoryDocument {
    fn select(&self, id: &str) -> Option<Arc<dyn SelectControl>> {
        match self.elements.get(id)? {
            MemoryElement::Select(s) => Some(s.clone() as Arc<dyn SelectControl>),
            _ => None,
        }
    }

    fn toggle(&self, id: &str) -> Option<Arc<dyn ToggleControl>> {
        match self.elements.get(id)? {
            MemoryElement::Toggle(t) => Some(t.clone() as Arc<dyn ToggleControl>),
            _ => None,
        }
    }

    fn text_target(&self, id: &str) -> Option<Arc<dyn TextTarget>> {
        match self.elements.get(id)? {
            MemoryElement::Text(t) => Some(t.clone() as Arc<dyn TextTarget>),
            _ => None,
        }
    }

    fn on_change(&self, id: &str, handler: ChangeHandler) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.entry(id.to_string()).or_default().push(handler);
        }
    }
}
