//! Configuration for tabshell
//!
//! Supports:
//! - `.tabshell/config.toml` - Engine settings

pub mod settings;
pub mod types;

pub use settings::{load_settings, save_settings, CONFIG_FILENAME, TABSHELL_DIR};
pub use types::*;
