//! Modulation "instrument" descriptors.
//!
//! An instrument is a secondary frequency that phase-modulates the tone. It
//! can be given as a number of Hz or as a note name, and is resolved once to
//! a plain frequency before synthesis.

use crate::{Error, Result, pitch};

/// Instrument descriptor for frequency-modulation synthesis.
///
/// # Example
///
/// ```rust
/// use tonal_synth::ModulationSpec;
///
/// assert_eq!(ModulationSpec::None.resolve().unwrap(), None);
/// assert_eq!(ModulationSpec::from("A4").resolve().unwrap(), Some(440.0));
/// assert_eq!(ModulationSpec::from(-3.0).resolve().unwrap(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModulationSpec {
    /// Plain sine, no modulation.
    #[default]
    None,
    /// Secondary frequency in Hz. The absolute value is used.
    NumericHz(f64),
    /// Secondary frequency taken from the note table.
    NoteName(String),
}

impl ModulationSpec {
    /// Resolve to the secondary frequency, or `None` for a plain sine.
    pub fn resolve(&self) -> Result<Option<f64>> {
        match self {
            ModulationSpec::None => Ok(None),
            ModulationSpec::NumericHz(hz) if hz.is_finite() => Ok(Some(hz.abs())),
            ModulationSpec::NumericHz(hz) => Err(Error::invalid(
                "instrument",
                format!("must be finite, got {hz}"),
            )),
            ModulationSpec::NoteName(name) => pitch::resolve(name).map(Some),
        }
    }
}

impl From<f64> for ModulationSpec {
    fn from(hz: f64) -> Self {
        ModulationSpec::NumericHz(hz)
    }
}

impl From<&str> for ModulationSpec {
    fn from(name: &str) -> Self {
        ModulationSpec::NoteName(name.to_string())
    }
}

impl From<String> for ModulationSpec {
    fn from(name: String) -> Self {
        ModulationSpec::NoteName(name)
    }
}

impl From<Option<f64>> for ModulationSpec {
    fn from(hz: Option<f64>) -> Self {
        hz.map_or(ModulationSpec::None, ModulationSpec::NumericHz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names_resolve_through_table() {
        let spec = ModulationSpec::from("Bb4");
        assert_eq!(spec.resolve().unwrap(), Some(466.16));
    }

    #[test]
    fn unknown_note_is_an_error() {
        let err = ModulationSpec::from("Fb3").resolve().unwrap_err();
        assert_eq!(err, Error::UnknownNote("Fb3".to_string()));
    }

    #[test]
    fn non_finite_numeric_is_rejected() {
        assert!(ModulationSpec::NumericHz(f64::NAN).resolve().is_err());
        assert!(ModulationSpec::NumericHz(f64::INFINITY).resolve().is_err());
    }

    #[test]
    fn zero_hz_is_a_valid_instrument() {
        assert_eq!(ModulationSpec::from(0.0).resolve().unwrap(), Some(0.0));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(ModulationSpec::from(None), ModulationSpec::None);
        assert_eq!(ModulationSpec::from(Some(1.0)), ModulationSpec::NumericHz(1.0));
    }
}
