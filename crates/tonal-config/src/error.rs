//! Error types for configuration and bank operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or sound banks.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Bank file could not be encoded
    #[error("failed to encode sound bank: {0}")]
    BankEncode(#[source] serde_json::Error),

    /// Bank file could not be decoded
    #[error("failed to decode sound bank: {0}")]
    BankDecode(#[source] serde_json::Error),

    /// Bank file decoded but does not match what was asked for
    #[error("sound bank mismatch: {0}")]
    BankMismatch(String),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(#[from] tonal_synth::Error),

    /// Rendering or playback failed
    #[error(transparent)]
    Io(#[from] tonal_io::Error),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}
