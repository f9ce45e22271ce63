//! Options form contract.
//!
//! The controller never touches a concrete UI. It looks elements up by id
//! through [`Document`] and talks to them through the small control traits
//! below, so any host (a web view bridge, a native window, the in-memory
//! document used by the harness) can provide the form.

use std::sync::Arc;

use crate::error::{OptionsError, Result};
use crate::settings::Settings;

pub mod memory;

pub use memory::MemoryDocument;

pub const ID_HINT: &str = "hint";
pub const ID_SKIP_KEY: &str = "skipKey";
pub const ID_HOLD_TO_SEND: &str = "holdToSend";
pub const ID_AUTO_EXPAND_CHATS: &str = "autoExpandChats";
pub const ID_AUTO_TEMP_CHAT: &str = "autoTempChat";

/// Controls whose change event triggers a save
pub const CHANGE_IDS: [&str; 4] = [
    ID_SKIP_KEY,
    ID_HOLD_TO_SEND,
    ID_AUTO_EXPAND_CHATS,
    ID_AUTO_TEMP_CHAT,
];

/// Single-selection control
pub trait SelectControl: Send + Sync {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

/// Checkbox-like toggle. Hosts may render an indeterminate state, but the
/// options page only reads and writes `checked`.
pub trait ToggleControl: Send + Sync {
    fn is_checked(&self) -> bool;
    fn set_checked(&self, checked: bool);
}

/// Element whose text content can be replaced
pub trait TextTarget: Send + Sync {
    fn set_text(&self, text: &str);
}

pub type ChangeHandler = Arc<dyn Fn() + Send + Sync>;

pub trait Document {
    fn select(&self, id: &str) -> Option<Arc<dyn SelectControl>>;
    fn toggle(&self, id: &str) -> Option<Arc<dyn ToggleControl>>;
    fn text_target(&self, id: &str) -> Option<Arc<dyn TextTarget>>;

    /// Run `handler` every time the control `id` changes through user input
    fn on_change(&self, id: &str, handler: ChangeHandler);
}

/// The five elements the options page needs, resolved once
#[derive(Clone)]
pub struct FormElements {
    hint: Arc<dyn TextTarget>,
    skip_key: Arc<dyn SelectControl>,
    hold_to_send: Arc<dyn ToggleControl>,
    auto_expand_chats: Arc<dyn ToggleControl>,
    auto_temp_chat: Arc<dyn ToggleControl>,
}

impl FormElements {
    /// Resolve every required element, failing on the first missing id.
    pub fn resolve(doc: &dyn Document) -> Result<Self> {
        fn required<T: ?Sized>(found: Option<Arc<T>>, id: &'static str) -> Result<Arc<T>> {
            found.ok_or(OptionsError::MissingElement(id))
        }

        Ok(Self {
            hint: required(doc.text_target(ID_HINT), ID_HINT)?,
            skip_key: required(doc.select(ID_SKIP_KEY), ID_SKIP_KEY)?,
            hold_to_send: required(doc.toggle(ID_HOLD_TO_SEND), ID_HOLD_TO_SEND)?,
            auto_expand_chats: required(doc.toggle(ID_AUTO_EXPAND_CHATS), ID_AUTO_EXPAND_CHATS)?,
            auto_temp_chat: required(doc.toggle(ID_AUTO_TEMP_CHAT), ID_AUTO_TEMP_CHAT)?,
        })
    }

    /// Reflect settings into the controls. `temp_chat_enabled` has no control.
    pub fn write(&self, settings: &Settings) {
        self.skip_key.set_value(&settings.skip_key);
        self.hold_to_send.set_checked(settings.hold_to_send);
        self.auto_expand_chats.set_checked(settings.auto_expand_chats);
        self.auto_temp_chat.set_checked(settings.auto_temp_chat);
    }

    /// Current form state as a save payload
    pub fn read(&self) -> Settings {
        Settings::from_form(
            self.skip_key.value(),
            self.hold_to_send.is_checked(),
            self.auto_expand_chats.is_checked(),
            self.auto_temp_chat.is_checked(),
        )
    }

    pub fn skip_key(&self) -> String {
        self.skip_key.value()
    }

    pub fn hold_to_send(&self) -> bool {
        self.hold_to_send.is_checked()
    }

    pub fn set_hint(&self, text: &str) {
        self.hint.set_text(text);
    }
}
