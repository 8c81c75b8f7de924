//! Error types for synthesis operations.

use thiserror::Error;

/// Errors produced while resolving pitches or validating synthesis parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The note name is not in the pitch table.
    #[error("unknown note: {0}")]
    UnknownNote(String),

    /// A synthesis parameter is out of range.
    #[error("invalid parameter '{param}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        param: &'static str,
        /// Description of why the value was rejected.
        reason: String,
    },
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            param,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for synthesis operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_note_display() {
        let err = Error::UnknownNote("H4".to_string());
        assert_eq!(err.to_string(), "unknown note: H4");
    }

    #[test]
    fn invalid_parameter_display() {
        let err = Error::invalid("duration", "must be positive, got -1");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'duration': must be positive, got -1"
        );
    }
}
