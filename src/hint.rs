use crate::i18n;
use crate::settings::SKIP_KEY_NONE;

/// Hint for the current skip key / hold-to-send combination, in English.
pub fn hint_text(skip_key: &str, hold_to_send: bool) -> String {
    hint_text_in("en", skip_key, hold_to_send)
}

/// Same hint rendered for a language preference (`auto`, `en`, `ja`).
pub fn hint_text_in(lang: &str, skip_key: &str, hold_to_send: bool) -> String {
    match (skip_key == SKIP_KEY_NONE, hold_to_send) {
        (true, false) => i18n::tr_in(lang, "hint-always-send"),
        (true, true) => i18n::tr_in(lang, "hint-send-disabled"),
        (false, false) => i18n::tr_args_in(lang, "hint-hold-to-skip", &[("key", skip_key)]),
        (false, true) => i18n::tr_args_in(lang, "hint-hold-to-send", &[("key", skip_key)]),
    }
}
