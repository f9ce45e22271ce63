//! Error types for the options page.
//!
//! Storage failures never reach the user; they are recovered inside
//! [`crate::storage::SettingsStorage`]. `OptionsError` is reserved for
//! startup problems the controller cannot recover from.

use thiserror::Error;

/// Failure of a single storage area operation
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error reported by the host, either returned from the call or raised
    /// through its out-of-band error channel
    #[error("storage area error: {0}")]
    Host(String),

    /// The completion was dropped without ever being invoked
    #[error("storage completion was dropped before it fired")]
    Abandoned,

    /// IO errors from file-backed areas
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data is not a JSON object
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while setting up the options page
#[derive(Error, Debug)]
pub enum OptionsError {
    /// A required form element is not present in the document
    #[error("required form element is missing: #{0}")]
    MissingElement(&'static str),

    /// Change handlers need a tokio runtime to spawn saves on
    #[error("no async runtime available for change handlers")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, OptionsError>;
