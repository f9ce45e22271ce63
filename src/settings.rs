use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StorageMap;

// Persisted key names (flat layout, no version field)
pub const KEY_SKIP_KEY: &str = "skipKey";
pub const KEY_HOLD_TO_SEND: &str = "holdToSend";
pub const KEY_AUTO_EXPAND_CHATS: &str = "autoExpandChats";
pub const KEY_AUTO_TEMP_CHAT: &str = "autoTempChat";
pub const KEY_TEMP_CHAT_ENABLED: &str = "tempChatEnabled";

/// Sentinel skip key meaning "no modifier selected"
pub const SKIP_KEY_NONE: &str = "None";

/// Values offered by the skip key selector
pub const SKIP_KEY_CHOICES: [&str; 5] = [SKIP_KEY_NONE, "Shift", "Ctrl", "Alt", "Meta"];

pub const DEFAULT_SKIP_KEY: &str = "Shift";
pub const DEFAULT_HOLD_TO_SEND: bool = false;
pub const DEFAULT_AUTO_EXPAND_CHATS: bool = true;
pub const DEFAULT_AUTO_TEMP_CHAT: bool = false;
pub const DEFAULT_TEMP_CHAT_ENABLED: bool = false;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    // Modifier key name or "None"
    pub skip_key: String,
    // Auto-send only while the skip key is held
    pub hold_to_send: bool,
    pub auto_expand_chats: bool,
    pub auto_temp_chat: bool,
    // Legacy alias of auto_temp_chat, mirrored on every save
    pub temp_chat_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_key: DEFAULT_SKIP_KEY.to_string(),
            hold_to_send: DEFAULT_HOLD_TO_SEND,
            auto_expand_chats: DEFAULT_AUTO_EXPAND_CHATS,
            auto_temp_chat: DEFAULT_AUTO_TEMP_CHAT,
            temp_chat_enabled: DEFAULT_TEMP_CHAT_ENABLED,
        }
    }
}

impl Settings {
    /// Build the save payload from form values.
    /// `temp_chat_enabled` always follows `auto_temp_chat`.
    pub fn from_form(
        skip_key: impl Into<String>,
        hold_to_send: bool,
        auto_expand_chats: bool,
        auto_temp_chat: bool,
    ) -> Self {
        Self {
            skip_key: skip_key.into(),
            hold_to_send,
            auto_expand_chats,
            auto_temp_chat,
            temp_chat_enabled: auto_temp_chat,
        }
    }

    /// Flat five-key mapping as written to storage
    pub fn to_storage_map(&self) -> StorageMap {
        let mut map = StorageMap::new();
        map.insert(KEY_SKIP_KEY.into(), Value::String(self.skip_key.clone()));
        map.insert(KEY_HOLD_TO_SEND.into(), Value::Bool(self.hold_to_send));
        map.insert(
            KEY_AUTO_EXPAND_CHATS.into(),
            Value::Bool(self.auto_expand_chats),
        );
        map.insert(KEY_AUTO_TEMP_CHAT.into(), Value::Bool(self.auto_temp_chat));
        map.insert(
            KEY_TEMP_CHAT_ENABLED.into(),
            Value::Bool(self.temp_chat_enabled),
        );
        map
    }
}

/// Key set handed to the storage get, each key carrying its default value.
pub fn default_keys() -> StorageMap {
    Settings::default().to_storage_map()
}

/// Repair a raw stored record into a complete `Settings`.
///
/// Each field is taken from `raw` only when it has the expected JSON type
/// (string for `skipKey`, boolean for the rest); anything else, including a
/// missing record, falls back to the default for that field.
pub fn normalize(raw: Option<&StorageMap>) -> Settings {
    let defaults = Settings::default();
    let Some(raw) = raw else {
        return defaults;
    };

    let string_or = |key: &str, fallback: String| match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => fallback,
    };
    let bool_or = |key: &str, fallback: bool| match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        _ => fallback,
    };

    Settings {
        skip_key: string_or(KEY_SKIP_KEY, defaults.skip_key),
        hold_to_send: bool_or(KEY_HOLD_TO_SEND, defaults.hold_to_send),
        auto_expand_chats: bool_or(KEY_AUTO_EXPAND_CHATS, defaults.auto_expand_chats),
        auto_temp_chat: bool_or(KEY_AUTO_TEMP_CHAT, defaults.auto_temp_chat),
        temp_chat_enabled: bool_or(KEY_TEMP_CHAT_ENABLED, defaults.temp_chat_enabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> StorageMap {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn empty_record_is_default() {
        assert_eq!(normalize(Some(&StorageMap::new())), Settings::default());
    }

    #[test]
    fn missing_record_is_default() {
        assert_eq!(normalize(None), Settings::default());
    }

    #[test]
    fn wrong_type_falls_back_per_field() {
        let raw = map(json!({ "skipKey": 42, "holdToSend": true }));
        let s = normalize(Some(&raw));
        assert_eq!(s.skip_key, "Shift");
        assert!(s.hold_to_send);
        assert!(s.auto_expand_chats);
        assert!(!s.auto_temp_chat);
        assert!(!s.temp_chat_enabled);
    }

    #[test]
    fn nulls_and_strings_for_booleans_are_rejected() {
        let raw = map(json!({
            "skipKey": null,
            "holdToSend": "true",
            "autoExpandChats": 0,
            "autoTempChat": null,
            "tempChatEnabled": [true],
        }));
        assert_eq!(normalize(Some(&raw)), Settings::default());
    }

    #[test]
    fn well_typed_values_are_kept() {
        let raw = map(json!({
            "skipKey": "Alt",
            "holdToSend": true,
            "autoExpandChats": false,
            "autoTempChat": true,
            "tempChatEnabled": false,
            "somethingNewer": 7,
        }));
        let s = normalize(Some(&raw));
        assert_eq!(
            s,
            Settings {
                skip_key: "Alt".into(),
                hold_to_send: true,
                auto_expand_chats: false,
                auto_temp_chat: true,
                // Not enforced on read
                temp_chat_enabled: false,
            }
        );
    }

    #[test]
    fn unknown_skip_key_string_is_kept() {
        let raw = map(json!({ "skipKey": "CapsLock" }));
        assert_eq!(normalize(Some(&raw)).skip_key, "CapsLock");
    }

    #[test]
    fn from_form_mirrors_temp_chat() {
        for hold in [false, true] {
            for expand in [false, true] {
                for temp in [false, true] {
                    let s = Settings::from_form("Ctrl", hold, expand, temp);
                    assert_eq!(s.temp_chat_enabled, s.auto_temp_chat);
                    let m = s.to_storage_map();
                    assert_eq!(m.get(KEY_TEMP_CHAT_ENABLED), m.get(KEY_AUTO_TEMP_CHAT));
                }
            }
        }
    }

    #[test]
    fn storage_map_matches_serde_layout() {
        let s = Settings::from_form("Meta", true, false, true);
        let via_serde = serde_json::to_value(&s).unwrap();
        assert_eq!(Value::Object(s.to_storage_map()), via_serde);
        assert_eq!(default_keys().len(), 5);
    }
}
