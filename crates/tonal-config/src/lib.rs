//! Configuration and persistence for the tonal sound engine.
//!
//! # Features
//!
//! - **App config**: [`AppConfig`] loaded from TOML with per-key defaults
//! - **Sound banks**: [`SoundBank`] with one basic and one organ clip per
//!   note, persisted as JSON and reloaded into the synthesis cache
//! - **Paths**: platform-specific config and cache directories
//!
//! # Example
//!
//! ```rust,no_run
//! use tonal_config::{AppConfig, BankKind, SoundBank};
//! use tonal_io::SoundEngine;
//!
//! let config = AppConfig::load_or_default(None).unwrap();
//! let engine = SoundEngine::cpal_default();
//! let mut bank = SoundBank::load_or_build(&engine, config.bank_spec(), config.bank_path()).unwrap();
//!
//! if let Some(sound) = bank.get_mut(BankKind::Organ, "A4") {
//!     sound.play();
//!     sound.wait_done();
//! }
//! ```

mod bank;
mod config;
mod error;

/// Platform-specific paths for configuration and cache files.
pub mod paths;

pub use bank::{BANK_FORMAT_VERSION, BankKind, BankOrigin, BankSpec, SoundBank};
pub use config::{AppConfig, DEFAULT_DURATION, DEFAULT_ORGAN_INSTRUMENT};
pub use error::ConfigError;
pub use paths::{config_file, default_bank_path, user_cache_dir, user_config_dir};
