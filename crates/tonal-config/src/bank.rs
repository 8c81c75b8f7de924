//! Persisted note banks.
//!
//! A [`SoundBank`] holds one clip per note for two timbres: `basic` (plain
//! sine) and `organ` (modulated by a low instrument frequency). Rendering
//! all of them takes a while, so the rendered samples are persisted as JSON
//! and reloaded on the next start.
//!
//! The file is purely a cache. [`SoundBank::load_or_build`] falls back to
//! rendering whenever the file is missing, unreadable, from another format
//! version, built from different settings, or holds a clip of the wrong
//! length; a successful rebuild always overwrites the file. None of those
//! failures are fatal.
//!
//! ```json
//! {
//!   "version": 1,
//!   "spec": { "duration_secs": 0.5, "sample_rate": 8000, ... },
//!   "basic": { "A4": [0, 12, 57, ...], ... },
//!   "organ": { "A4": [0, 3, 9, ...], ... }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tonal_io::{Sound, SoundEngine};
use tonal_synth::{
    DEFAULT_FADE_FRACTION, DEFAULT_MODULATION_STRENGTH, DEFAULT_SAMPLE_RATE, DEFAULT_VOLUME,
    Note, PcmBuffer, SynthesisParams, pitch,
};

use crate::config::{DEFAULT_DURATION, DEFAULT_ORGAN_INSTRUMENT};
use crate::{ConfigError, paths};

/// Format version written to and expected from bank files.
pub const BANK_FORMAT_VERSION: u32 = 1;

/// Settings every clip in a bank is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankSpec {
    /// Clip length in seconds.
    pub duration_secs: f64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Clip volume in `[0, 1]`.
    pub volume: f64,
    /// Fade ramp length as a fraction of a second.
    pub fade_fraction: f64,
    /// Modulating frequency of the organ clips, in Hz.
    pub organ_instrument_hz: f64,
    /// Modulation strength of the organ clips.
    pub organ_strength: f64,
}

impl Default for BankSpec {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION,
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: DEFAULT_VOLUME,
            fade_fraction: DEFAULT_FADE_FRACTION,
            organ_instrument_hz: DEFAULT_ORGAN_INSTRUMENT,
            organ_strength: DEFAULT_MODULATION_STRENGTH,
        }
    }
}

impl BankSpec {
    /// Parameters of the plain clip at `frequency_hz`.
    pub fn basic_params(&self, frequency_hz: f64) -> SynthesisParams {
        SynthesisParams::new(frequency_hz, self.duration_secs)
            .with_volume(self.volume)
            .with_sample_rate(self.sample_rate)
            .with_fade_fraction(self.fade_fraction)
    }

    /// Parameters of the organ clip at `frequency_hz`.
    pub fn organ_params(&self, frequency_hz: f64) -> SynthesisParams {
        self.basic_params(frequency_hz)
            .with_modulation(Some(self.organ_instrument_hz))
            .with_modulation_strength(self.organ_strength)
    }

    /// Parameters of the `kind` clip at `frequency_hz`.
    pub fn params(&self, kind: BankKind, frequency_hz: f64) -> SynthesisParams {
        match kind {
            BankKind::Basic => self.basic_params(frequency_hz),
            BankKind::Organ => self.organ_params(frequency_hz),
        }
    }
}

/// Which of the two tables in a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind {
    /// Plain sine clips.
    Basic,
    /// Modulated clips.
    Organ,
}

impl BankKind {
    /// Both tables, in file order.
    pub const ALL: [BankKind; 2] = [BankKind::Basic, BankKind::Organ];

    /// Lowercase name used in files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            BankKind::Basic => "basic",
            BankKind::Organ => "organ",
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BankKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(BankKind::Basic),
            "organ" => Ok(BankKind::Organ),
            other => Err(format!("unknown bank '{other}', expected basic or organ")),
        }
    }
}

/// Where a bank's clips came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankOrigin {
    /// Read from the bank file.
    Loaded,
    /// Rendered in this process.
    Built,
}

/// On-disk layout.
#[derive(Serialize, Deserialize)]
struct BankFile {
    version: u32,
    spec: BankSpec,
    basic: BTreeMap<String, Vec<i16>>,
    organ: BTreeMap<String, Vec<i16>>,
}

/// One clip per note, for both tables.
#[derive(Debug)]
pub struct SoundBank {
    spec: BankSpec,
    origin: BankOrigin,
    basic: HashMap<&'static str, Sound>,
    organ: HashMap<&'static str, Sound>,
}

impl SoundBank {
    /// Render every clip through the engine's cache.
    pub fn build(engine: &SoundEngine, spec: BankSpec) -> Result<Self, ConfigError> {
        let mut basic = HashMap::with_capacity(pitch::len());
        let mut organ = HashMap::with_capacity(pitch::len());
        for note in pitch::notes() {
            let freq = note.frequency_hz();
            basic.insert(note.name(), Sound::new(engine, spec.basic_params(freq))?);
            organ.insert(note.name(), Sound::new(engine, spec.organ_params(freq))?);
        }
        tracing::info!(notes = basic.len(), "sound bank built");
        Ok(Self {
            spec,
            origin: BankOrigin::Built,
            basic,
            organ,
        })
    }

    /// Read a bank file built with `spec`.
    ///
    /// Every loaded clip is primed into the engine's cache before the sounds
    /// are created, so nothing is rendered.
    pub fn load(
        engine: &SoundEngine,
        spec: BankSpec,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ConfigError::read_file(path, e))?;
        let file: BankFile = serde_json::from_slice(&bytes).map_err(ConfigError::BankDecode)?;

        if file.version != BANK_FORMAT_VERSION {
            return Err(ConfigError::BankMismatch(format!(
                "format version {}, expected {BANK_FORMAT_VERSION}",
                file.version
            )));
        }
        if file.spec != spec {
            return Err(ConfigError::BankMismatch(
                "file was built with different settings".to_string(),
            ));
        }

        let mut basic = HashMap::with_capacity(pitch::len());
        let mut organ = HashMap::with_capacity(pitch::len());
        for note in pitch::notes() {
            basic.insert(
                note.name(),
                restore(engine, &spec, BankKind::Basic, note, &file.basic)?,
            );
            organ.insert(
                note.name(),
                restore(engine, &spec, BankKind::Organ, note, &file.organ)?,
            );
        }
        tracing::info!(path = %path.display(), notes = basic.len(), "sound bank loaded");
        Ok(Self {
            spec,
            origin: BankOrigin::Loaded,
            basic,
            organ,
        })
    }

    /// Load `path` if it holds a valid bank for `spec`; otherwise render and
    /// overwrite it.
    ///
    /// Load and save failures are logged, never returned. Only a spec that
    /// cannot be rendered at all is an error.
    pub fn load_or_build(
        engine: &SoundEngine,
        spec: BankSpec,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            match Self::load(engine, spec, path) {
                Ok(bank) => return Ok(bank),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "sound bank unusable; rebuilding");
                }
            }
        } else {
            tracing::info!(path = %path.display(), "no sound bank file; building");
        }

        let bank = Self::build(engine, spec)?;
        if let Err(err) = bank.save(path) {
            tracing::warn!(path = %path.display(), error = %err, "failed to save sound bank");
        }
        Ok(bank)
    }

    /// Write the bank to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        paths::ensure_parent_dir(path)?;
        let file = BankFile {
            version: BANK_FORMAT_VERSION,
            spec: self.spec,
            basic: encode_table(&self.basic),
            organ: encode_table(&self.organ),
        };
        let bytes = serde_json::to_vec(&file).map_err(ConfigError::BankEncode)?;
        std::fs::write(path, bytes).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::info!(path = %path.display(), "sound bank saved");
        Ok(())
    }

    /// The clip for `name` in `kind`.
    pub fn get(&self, kind: BankKind, name: &str) -> Option<&Sound> {
        self.table(kind).get(name)
    }

    /// Mutable access, for playing a clip.
    pub fn get_mut(&mut self, kind: BankKind, name: &str) -> Option<&mut Sound> {
        match kind {
            BankKind::Basic => self.basic.get_mut(name),
            BankKind::Organ => self.organ.get_mut(name),
        }
    }

    /// Plain clip for `name`.
    pub fn basic(&self, name: &str) -> Option<&Sound> {
        self.get(BankKind::Basic, name)
    }

    /// Organ clip for `name`.
    pub fn organ(&self, name: &str) -> Option<&Sound> {
        self.get(BankKind::Organ, name)
    }

    /// Clips of `kind` in canonical note order.
    pub fn iter(&self, kind: BankKind) -> impl Iterator<Item = (&'static str, &Sound)> + '_ {
        let table = self.table(kind);
        pitch::notes().filter_map(move |note| table.get(note.name()).map(|s| (note.name(), s)))
    }

    /// Stop every clip in both tables.
    pub fn stop_all(&mut self) {
        for sound in self.basic.values_mut().chain(self.organ.values_mut()) {
            sound.stop();
        }
    }

    /// Settings the clips were rendered with.
    pub fn spec(&self) -> &BankSpec {
        &self.spec
    }

    /// Whether the clips were loaded or rendered.
    pub fn origin(&self) -> BankOrigin {
        self.origin
    }

    /// Number of notes per table.
    pub fn len(&self) -> usize {
        self.basic.len()
    }

    /// Whether the bank holds no notes.
    pub fn is_empty(&self) -> bool {
        self.basic.is_empty()
    }

    fn table(&self, kind: BankKind) -> &HashMap<&'static str, Sound> {
        match kind {
            BankKind::Basic => &self.basic,
            BankKind::Organ => &self.organ,
        }
    }
}

fn restore(
    engine: &SoundEngine,
    spec: &BankSpec,
    kind: BankKind,
    note: Note,
    table: &BTreeMap<String, Vec<i16>>,
) -> Result<Sound, ConfigError> {
    let samples = table.get(note.name()).ok_or_else(|| {
        ConfigError::BankMismatch(format!("{kind} table is missing {}", note.name()))
    })?;
    let params = spec.params(kind, note.frequency_hz());
    let buffer = PcmBuffer::from_samples(samples.clone(), spec.sample_rate);
    engine.cache().prime(&params, buffer).map_err(|e| {
        ConfigError::BankMismatch(format!("{kind} clip {}: {e}", note.name()))
    })?;
    Ok(Sound::new(engine, params)?)
}

fn encode_table(table: &HashMap<&'static str, Sound>) -> BTreeMap<String, Vec<i16>> {
    table
        .iter()
        .map(|(name, sound)| ((*name).to_string(), sound.buffer().samples().to_vec()))
        .collect()
}
