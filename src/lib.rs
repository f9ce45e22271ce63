pub mod controller;
pub mod error;
pub mod form;
pub mod hint;
pub mod i18n;
pub mod settings;
pub mod storage;
pub mod utils;

pub use controller::OptionsController;
pub use settings::{normalize, Settings};
