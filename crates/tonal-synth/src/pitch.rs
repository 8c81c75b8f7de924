/*
Note Frequency Table
====================

Fixed mapping from note names to frequencies in Hz, covering octaves 0-8.

Naming Convention:
- Natural notes: C4, D4, E4, etc.
- Sharps: C#4, D#4, F#4, G#4, A#4
- Flats: Db4, Eb4, Gb4, Ab4, Bb4 (same frequency as the matching sharp)
- B#, E#, Cb and Fb spellings are not part of the table

The values are rounded to two decimals and must not be recomputed from the
equal-temperament formula: previously rendered buffers were produced from
exactly these numbers.

Canonical order (used for enumeration):
  octave digit, then letter C < D < E < F < G < A < B,
  then accidental flat < natural < sharp

  e.g. ... A#3, Bb3, B3, C4, C#4, Db4, D4, D#4, Eb4, E4 ...
*/

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Every known note spelling and its frequency in Hz.
const NOTE_TABLE: [(&str, f64); 153] = [
    ("C0", 16.35),
    ("D0", 18.35),
    ("E0", 20.60),
    ("F0", 21.83),
    ("G0", 24.50),
    ("A0", 27.50),
    ("B0", 30.87),
    ("C1", 32.70),
    ("D1", 36.71),
    ("E1", 41.20),
    ("F1", 43.65),
    ("G1", 49.00),
    ("A1", 55.00),
    ("B1", 61.74),
    ("C2", 65.41),
    ("D2", 73.42),
    ("E2", 82.41),
    ("F2", 87.31),
    ("G2", 98.00),
    ("A2", 110.00),
    ("B2", 123.47),
    ("C3", 130.81),
    ("D3", 146.83),
    ("E3", 164.81),
    ("F3", 174.61),
    ("G3", 196.00),
    ("A3", 220.00),
    ("B3", 246.94),
    ("C4", 261.63),
    ("D4", 293.66),
    ("E4", 329.63),
    ("F4", 349.23),
    ("G4", 392.00),
    ("A4", 440.00),
    ("B4", 493.88),
    ("C5", 523.25),
    ("D5", 587.33),
    ("E5", 659.25),
    ("F5", 698.46),
    ("G5", 783.99),
    ("A5", 880.00),
    ("B5", 987.77),
    ("C6", 1046.50),
    ("D6", 1174.66),
    ("E6", 1318.51),
    ("F6", 1396.91),
    ("G6", 1567.98),
    ("A6", 1760.00),
    ("B6", 1975.53),
    ("C7", 2093.00),
    ("D7", 2349.32),
    ("E7", 2637.02),
    ("F7", 2793.83),
    ("G7", 3135.96),
    ("A7", 3520.00),
    ("B7", 3951.07),
    ("C8", 4186.01),
    ("D8", 4698.63),
    ("E8", 5274.04),
    ("F8", 5587.65),
    ("G8", 6271.93),
    ("A8", 7040.00),
    ("B8", 7902.13),
    ("C#0", 17.32),
    ("Db0", 17.32),
    ("D#0", 19.45),
    ("Eb0", 19.45),
    ("F#0", 23.12),
    ("Gb0", 23.12),
    ("G#0", 25.96),
    ("Ab0", 25.96),
    ("A#0", 29.14),
    ("Bb0", 29.14),
    ("C#1", 34.65),
    ("Db1", 34.65),
    ("D#1", 38.89),
    ("Eb1", 38.89),
    ("F#1", 46.25),
    ("Gb1", 46.25),
    ("G#1", 51.91),
    ("Ab1", 51.91),
    ("A#1", 58.27),
    ("Bb1", 58.27),
    ("C#2", 69.30),
    ("Db2", 69.30),
    ("D#2", 77.78),
    ("Eb2", 77.78),
    ("F#2", 92.50),
    ("Gb2", 92.50),
    ("G#2", 103.83),
    ("Ab2", 103.83),
    ("A#2", 116.54),
    ("Bb2", 116.54),
    ("C#3", 138.59),
    ("Db3", 138.59),
    ("D#3", 155.56),
    ("Eb3", 155.56),
    ("F#3", 185.00),
    ("Gb3", 185.00),
    ("G#3", 207.65),
    ("Ab3", 207.65),
    ("A#3", 233.08),
    ("Bb3", 233.08),
    ("C#4", 277.18),
    ("Db4", 277.18),
    ("D#4", 311.13),
    ("Eb4", 311.13),
    ("F#4", 369.99),
    ("Gb4", 369.99),
    ("G#4", 415.30),
    ("Ab4", 415.30),
    ("A#4", 466.16),
    ("Bb4", 466.16),
    ("C#5", 554.37),
    ("Db5", 554.37),
    ("D#5", 622.25),
    ("Eb5", 622.25),
    ("F#5", 739.99),
    ("Gb5", 739.99),
    ("G#5", 830.61),
    ("Ab5", 830.61),
    ("A#5", 932.33),
    ("Bb5", 932.33),
    ("C#6", 1108.73),
    ("Db6", 1108.73),
    ("D#6", 1244.51),
    ("Eb6", 1244.51),
    ("F#6", 1479.98),
    ("Gb6", 1479.98),
    ("G#6", 1661.22),
    ("Ab6", 1661.22),
    ("A#6", 1864.66),
    ("Bb6", 1864.66),
    ("C#7", 2217.46),
    ("Db7", 2217.46),
    ("D#7", 2489.02),
    ("Eb7", 2489.02),
    ("F#7", 2959.96),
    ("Gb7", 2959.96),
    ("G#7", 3322.44),
    ("Ab7", 3322.44),
    ("A#7", 3729.31),
    ("Bb7", 3729.31),
    ("C#8", 4434.92),
    ("Db8", 4434.92),
    ("D#8", 4978.03),
    ("Eb8", 4978.03),
    ("F#8", 5919.91),
    ("Gb8", 5919.91),
    ("G#8", 6644.88),
    ("Ab8", 6644.88),
    ("A#8", 7458.62),
    ("Bb8", 7458.62),
];

static INDEX: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| NOTE_TABLE.iter().copied().collect());

static ORDERED: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut names: Vec<&'static str> = NOTE_TABLE.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|name| order_key(name));
    names
});

/// A named pitch from the note table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    name: &'static str,
    frequency_hz: f64,
}

impl Note {
    /// Look up a note by name.
    pub fn from_name(name: &str) -> Result<Self> {
        NOTE_TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(name, frequency_hz)| Self { name, frequency_hz })
            .ok_or_else(|| Error::UnknownNote(name.to_string()))
    }

    /// Note name as spelled in the table (e.g. `"Eb4"`).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Frequency in Hz.
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Octave digit (0-8).
    pub fn octave(&self) -> u8 {
        order_key(self.name).0
    }
}

/// Resolve a note name to its frequency in Hz.
///
/// # Example
///
/// ```rust
/// use tonal_synth::pitch;
///
/// assert_eq!(pitch::resolve("A4").unwrap(), 440.0);
/// assert_eq!(pitch::resolve("Bb4").unwrap(), pitch::resolve("A#4").unwrap());
/// assert!(pitch::resolve("E#4").is_err());
/// ```
pub fn resolve(name: &str) -> Result<f64> {
    INDEX
        .get(name)
        .copied()
        .ok_or_else(|| Error::UnknownNote(name.to_string()))
}

/// Whether `name` is a known note spelling.
pub fn contains(name: &str) -> bool {
    INDEX.contains_key(name)
}

/// Number of note spellings in the table.
pub fn len() -> usize {
    NOTE_TABLE.len()
}

/// All note names in canonical ascending order.
///
/// Sorted by octave, then letter (C..B), then accidental (flat, natural,
/// sharp). Enharmonic spellings are separate entries: `C#4` sorts with the
/// C's and `Db4` with the D's.
pub fn ordered_names() -> Vec<&'static str> {
    ORDERED.clone()
}

/// Iterate over every note in canonical order.
pub fn notes() -> impl Iterator<Item = Note> {
    ORDERED.iter().map(|&name| Note {
        name,
        frequency_hz: INDEX[name],
    })
}

/// A pitch given either directly in Hz or as a note name.
///
/// Numeric pitches use their absolute value, so `Pitch::Hz(-440.0)` and
/// `Pitch::Hz(440.0)` resolve to the same frequency.
#[derive(Debug, Clone, PartialEq)]
pub enum Pitch {
    /// Frequency in Hz.
    Hz(f64),
    /// Note name looked up in the table.
    Note(String),
}

impl Pitch {
    /// Resolve to a frequency in Hz.
    pub fn resolve(&self) -> Result<f64> {
        match self {
            Pitch::Hz(hz) => Ok(hz.abs()),
            Pitch::Note(name) => resolve(name),
        }
    }
}

impl From<f64> for Pitch {
    fn from(hz: f64) -> Self {
        Pitch::Hz(hz)
    }
}

impl From<&str> for Pitch {
    fn from(name: &str) -> Self {
        Pitch::Note(name.to_string())
    }
}

impl From<String> for Pitch {
    fn from(name: String) -> Self {
        Pitch::Note(name)
    }
}

impl From<Note> for Pitch {
    fn from(note: Note) -> Self {
        Pitch::Hz(note.frequency_hz)
    }
}

/// Sort key: (octave, letter class, accidental class).
fn order_key(name: &str) -> (u8, u8, u8) {
    let bytes = name.as_bytes();
    let letter = match bytes.first() {
        Some(b'C') => 0,
        Some(b'D') => 1,
        Some(b'E') => 2,
        Some(b'F') => 3,
        Some(b'G') => 4,
        Some(b'A') => 5,
        Some(b'B') => 6,
        _ => u8::MAX,
    };
    let octave = bytes
        .last()
        .filter(|b| b.is_ascii_digit())
        .map_or(u8::MAX, |b| b - b'0');
    let accidental = match name.get(1..name.len().saturating_sub(1)) {
        Some("b") => 0,
        Some("") => 1,
        Some("#") => 2,
        _ => u8::MAX,
    };
    (octave, letter, accidental)
}
