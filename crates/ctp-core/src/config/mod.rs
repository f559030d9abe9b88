//! Runtime configuration

mod settings;

pub use settings::{Settings, DEFAULT_API_URL, DEFAULT_SCRIPT_EXTENSIONS};
