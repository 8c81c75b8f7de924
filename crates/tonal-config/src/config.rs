//! Application configuration file.
//!
//! ```toml
//! sample_rate = 8000
//! volume = 0.2
//! duration = 0.5
//! fade = 0.01
//! organ_instrument = 1.0
//! organ_strength = 1.0
//! bank_path = "/home/me/.cache/tonal/sounds.json"
//! output_device = "USB"
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above
//! (`bank_path` and `output_device` default to unset).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tonal_synth::{
    DEFAULT_FADE_FRACTION, DEFAULT_MODULATION_STRENGTH, DEFAULT_SAMPLE_RATE, DEFAULT_VOLUME,
    SynthesisParams,
};

use crate::bank::BankSpec;
use crate::{ConfigError, paths};

/// Default clip length in seconds.
pub const DEFAULT_DURATION: f64 = 0.5;

/// Default modulating frequency of the organ bank, in Hz.
pub const DEFAULT_ORGAN_INSTRUMENT: f64 = 1.0;

/// User settings for the `tonal` tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sample rate of rendered clips, in Hz.
    pub sample_rate: u32,
    /// Default volume in `[0, 1]`.
    pub volume: f64,
    /// Default clip duration in seconds.
    pub duration: f64,
    /// Fade ramp length as a fraction of a second.
    pub fade: f64,
    /// Modulating frequency of the organ bank, in Hz.
    pub organ_instrument: f64,
    /// Modulation strength of the organ bank.
    pub organ_strength: f64,
    /// Where the sound bank is persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_path: Option<PathBuf>,
    /// Output device name filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: DEFAULT_VOLUME,
            duration: DEFAULT_DURATION,
            fade: DEFAULT_FADE_FRACTION,
            organ_instrument: DEFAULT_ORGAN_INSTRUMENT,
            organ_strength: DEFAULT_MODULATION_STRENGTH,
            bank_path: None,
            output_device: None,
        }
    }
}

impl AppConfig {
    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from an explicit path, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = paths::config_file();
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        paths::ensure_parent_dir(path)?;
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Reject values no clip could be rendered with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_params(440.0).validate()?;
        self.bank_spec().organ_params(440.0).validate()?;
        Ok(())
    }

    /// Parameters for an unmodulated clip at `frequency_hz` using the
    /// configured defaults.
    pub fn base_params(&self, frequency_hz: f64) -> SynthesisParams {
        SynthesisParams::new(frequency_hz, self.duration)
            .with_volume(self.volume)
            .with_sample_rate(self.sample_rate)
            .with_fade_fraction(self.fade)
    }

    /// The bank layout these settings describe.
    pub fn bank_spec(&self) -> BankSpec {
        BankSpec {
            duration_secs: self.duration,
            sample_rate: self.sample_rate,
            volume: self.volume,
            fade_fraction: self.fade,
            organ_instrument_hz: self.organ_instrument.abs(),
            organ_strength: self.organ_strength,
        }
    }

    /// Configured bank path, or the platform default.
    pub fn bank_path(&self) -> PathBuf {
        self.bank_path
            .clone()
            .unwrap_or_else(paths::default_bank_path)
    }
}
