//! Platform-specific paths for configuration and cached sound banks.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/tonal/` (Linux), `~/Library/Application Support/tonal/` (macOS), `%APPDATA%\tonal\` (Windows)
//! - **User cache**: `~/.cache/tonal/` (Linux), `~/Library/Caches/tonal/` (macOS), `%LOCALAPPDATA%\tonal\` (Windows)
//!
//! # Example
//!
//! ```rust,no_run
//! use tonal_config::paths;
//!
//! println!("config: {:?}", paths::config_file());
//! println!("bank:   {:?}", paths::default_bank_path());
//! ```

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "tonal";

/// File name of the application config.
const CONFIG_FILE: &str = "config.toml";

/// File name of the persisted sound bank.
const BANK_FILE: &str = "sounds.json";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific cache directory.
///
/// Returns a fallback path if the cache directory cannot be determined.
pub fn user_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the application config file.
pub fn config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Default location of the persisted sound bank.
pub fn default_bank_path() -> PathBuf {
    user_cache_dir().join(BANK_FILE)
}

/// Create the parent directory of `path` if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }
    Ok(())
}
