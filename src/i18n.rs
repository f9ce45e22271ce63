use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use unic_langid::LanguageIdentifier;

// Normalize locale strings like "ja_JP.UTF-8" or "ja-JP" to BCP47-ish form
// Example: "ja_JP.UTF-8" -> "ja-JP"
fn normalize_locale_tag<S: AsRef<str>>(s: S) -> String {
    let mut tag = s.as_ref().trim().to_string();
    if let Some((lang_region, _encoding)) = tag.split_once('.') {
        tag = lang_region.to_string();
    }
    tag.replace('_', "-")
}

fn english() -> LanguageIdentifier {
    "en-US".parse().unwrap_or_default()
}

fn japanese() -> LanguageIdentifier {
    "ja".parse().unwrap_or_default()
}

fn parse_tag(raw: &str) -> Option<LanguageIdentifier> {
    let norm = normalize_locale_tag(raw);
    if let Ok(li) = norm.parse::<LanguageIdentifier>() {
        return Some(li);
    }
    // Heuristic fallback by language prefix
    let low = norm.to_lowercase();
    if low.starts_with("ja") {
        return Some(japanese());
    }
    if low.starts_with("en") {
        return Some(english());
    }
    None
}

fn detect_lang() -> LanguageIdentifier {
    // 1) Explicit override via env var
    if let Ok(s) = std::env::var("AUTOSEND_UI_LANG") {
        let s = s.trim();
        if !s.is_empty() && s != "auto" {
            if let Some(li) = parse_tag(s) {
                return li;
            }
        }
    }

    // 2) OS/UI locale via sys-locale
    if let Some(li) = sys_locale::get_locale().as_deref().and_then(parse_tag) {
        return li;
    }

    // 3) Common UNIX envs as a last resort
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Some(li) = std::env::var(key).ok().as_deref().and_then(parse_tag) {
            return li;
        }
    }

    english()
}

// Detected once per process
static DETECTED_LANG: Lazy<LanguageIdentifier> = Lazy::new(detect_lang);

type Bundle = fluent_bundle::concurrent::FluentBundle<FluentResource>;

fn build_bundle(lang: LanguageIdentifier) -> Bundle {
    let ftl: &str = match lang.language.as_str() {
        "ja" => include_str!("../i18n/ja/options.ftl"),
        _ => include_str!("../i18n/en/options.ftl"),
    };

    let mut bundle = Bundle::new_concurrent(vec![lang.clone()]);
    // Hint text is compared verbatim; no bidi isolation marks around $key
    bundle.set_use_isolating(false);

    let resource = match FluentResource::try_new(ftl.to_owned()) {
        Ok(res) => res,
        Err((_, errs)) => {
            tracing::warn!(
                "failed to parse FTL for {}: {:?}; falling back to English",
                lang,
                errs
            );
            if lang.language != "en" {
                return build_bundle(english());
            }
            return bundle;
        }
    };
    if let Err(errs) = bundle.add_resource(resource) {
        tracing::warn!("failed to add FTL resource for {}: {:?}", lang, errs);
        if lang.language != "en" {
            return build_bundle(english());
        }
    }
    bundle
}

// Parsed once per language; hints are rendered on every save
static EN_BUNDLE: Lazy<Bundle> = Lazy::new(|| build_bundle(english()));
static JA_BUNDLE: Lazy<Bundle> = Lazy::new(|| build_bundle(japanese()));

fn bundle_for(pref: &str) -> &'static Bundle {
    let japanese = match pref.trim().to_lowercase().as_str() {
        "ja" => true,
        "en" | "en-us" => false,
        _ => DETECTED_LANG.language == "ja",
    };
    if japanese {
        &*JA_BUNDLE
    } else {
        &*EN_BUNDLE
    }
}

/// Translate `id` for a language preference (`auto`, `en`, `ja`).
/// Unknown ids come back unchanged.
pub fn tr_in(pref: &str, id: &str) -> String {
    tr_args_in(pref, id, &[])
}

pub fn tr_args_in(pref: &str, id: &str, args: &[(&str, &str)]) -> String {
    let bundle = bundle_for(pref);
    let Some(pattern) = bundle.get_message(id).and_then(|m| m.value()) else {
        return id.to_string();
    };

    let fluent_args = (!args.is_empty()).then(|| {
        let mut fa = FluentArgs::new();
        for (name, value) in args {
            fa.set(*name, FluentValue::from(*value));
        }
        fa
    });
    let mut errors = vec![];
    let value: Cow<str> = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
    if !errors.is_empty() {
        tracing::debug!("fluent errors formatting {}: {:?}", id, errors);
    }
    value.into_owned()
}
