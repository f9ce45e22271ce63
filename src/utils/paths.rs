use directories::BaseDirs;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "AutosendOptions";

/// Application config directory.
/// `AUTOSEND_CONFIG_DIR` wins; otherwise the OS standard location:
/// Linux: ~/.config/AutosendOptions
/// macOS: ~/Library/Application Support/AutosendOptions
/// Windows: %APPDATA%\\AutosendOptions
pub fn app_config_dir() -> PathBuf {
    if let Some(dir) = env_dir("AUTOSEND_CONFIG_DIR") {
        return dir;
    }
    if let Some(base) = BaseDirs::new() {
        return base.config_dir().join(APP_DIR_NAME);
    }
    // Fallback: current working directory
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Directory backing the synced area, if configured
pub fn sync_dir() -> Option<PathBuf> {
    env_dir("AUTOSEND_SYNC_DIR")
}

/// Directory backing the local area
pub fn local_dir() -> PathBuf {
    app_config_dir().join("local")
}

fn env_dir(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
