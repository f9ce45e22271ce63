use anyhow::{bail, Context, Result};
use std::sync::Arc;

use autosend_options::form::{
    MemoryDocument, ID_AUTO_EXPAND_CHATS, ID_AUTO_TEMP_CHAT, ID_HINT, ID_HOLD_TO_SEND,
    ID_SKIP_KEY,
};
use autosend_options::settings::SKIP_KEY_CHOICES;
use autosend_options::storage::{HostEnvironment, JsonFileArea, Namespace, StorageApi};
use autosend_options::{i18n, utils, OptionsController};

const APP_NAME: &str = "autosend-options";

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("Usage: {} [--reset] [field=value ...]", APP_NAME);
    eprintln!("  skipKey=<{}>", SKIP_KEY_CHOICES.join("|"));
    eprintln!("  holdToSend=<true|false>");
    eprintln!("  autoExpandChats=<true|false>");
    eprintln!("  autoTempChat=<true|false>");
}

/// A form edit requested on the command line
enum Edit {
    Select(&'static str, String),
    Toggle(&'static str, bool),
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "true" | "TRUE" | "on" | "ON" => Some(true),
        "0" | "false" | "FALSE" | "off" | "OFF" => Some(false),
        _ => None,
    }
}

fn parse_edit(arg: &str) -> Result<Edit> {
    let Some((field, value)) = arg.split_once('=') else {
        bail!("expected field=value, got '{}'", arg);
    };
    let toggle = |id: &'static str| -> Result<Edit> {
        let checked = parse_bool(value)
            .with_context(|| format!("{} expects true or false, got '{}'", id, value))?;
        Ok(Edit::Toggle(id, checked))
    };
    match field {
        ID_SKIP_KEY => {
            if !SKIP_KEY_CHOICES.contains(&value) {
                bail!(
                    "skipKey must be one of {}, got '{}'",
                    SKIP_KEY_CHOICES.join(", "),
                    value
                );
            }
            Ok(Edit::Select(ID_SKIP_KEY, value.to_string()))
        }
        ID_HOLD_TO_SEND => toggle(ID_HOLD_TO_SEND),
        ID_AUTO_EXPAND_CHATS => toggle(ID_AUTO_EXPAND_CHATS),
        ID_AUTO_TEMP_CHAT => toggle(ID_AUTO_TEMP_CHAT),
        other => bail!("unknown field '{}'", other),
    }
}

/// Local area under the config dir; a synced area only when AUTOSEND_SYNC_DIR is set
fn host_environment() -> HostEnvironment {
    let local_dir = utils::paths::local_dir();
    tracing::info!("local storage: {}", local_dir.display());
    let mut api = StorageApi::new().with_local(Arc::new(JsonFileArea::in_dir(local_dir)));
    if let Some(sync_dir) = utils::paths::sync_dir() {
        tracing::info!("sync storage: {}", sync_dir.display());
        api = api.with_sync(Arc::new(JsonFileArea::in_dir(sync_dir)));
    }
    HostEnvironment::new().with_namespace(Namespace::Browser, api)
}

fn print_summary(doc: &MemoryDocument, lang: &str) {
    let label = |id: &str| i18n::tr_in(lang, id);
    let text = |v: Option<String>| v.unwrap_or_default();
    let flag = |v: Option<bool>| v.map(|b| b.to_string()).unwrap_or_default();

    println!("{}: {}", label("label-skip-key"), text(doc.select_value(ID_SKIP_KEY)));
    println!(
        "{}: {}",
        label("label-hold-to-send"),
        flag(doc.is_checked(ID_HOLD_TO_SEND))
    );
    println!(
        "{}: {}",
        label("label-auto-expand-chats"),
        flag(doc.is_checked(ID_AUTO_EXPAND_CHATS))
    );
    println!(
        "{}: {}",
        label("label-auto-temp-chat"),
        flag(doc.is_checked(ID_AUTO_TEMP_CHAT))
    );
    println!();
    println!("{}", text(doc.text(ID_HINT)));
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    tracing::info!("{} version {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let mut reset = false;
    let mut edits = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "--reset" => reset = true,
            _ => edits.push(parse_edit(&arg)?),
        }
    }

    let lang = std::env::var("AUTOSEND_UI_LANG").unwrap_or_else(|_| "auto".to_string());
    let doc = MemoryDocument::options_page();
    let storage = host_environment().storage();
    let controller = OptionsController::start_with_language(&doc, storage, &lang)
        .await
        .context("failed to start options page")?;

    if reset {
        match controller.reset().await {
            Some(area) => println!("{}: {}", i18n::tr_in(&lang, "label-saved-to"), area),
            None => println!("{}", i18n::tr_in(&lang, "label-not-saved")),
        }
    }

    for edit in edits {
        match edit {
            Edit::Select(id, value) => doc.user_select(id, &value),
            Edit::Toggle(id, checked) => doc.user_toggle(id, checked),
        };
    }
    controller.flush().await;

    print_summary(&doc, &lang);
    Ok(())
}
