//! Unified error hierarchy for peloton-tcx
//!
//! Transcoding failures are scoped to a single workout: callers log them and
//! move on to the next record.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all peloton-tcx operations
#[derive(Debug, Error)]
pub enum PelotonTcxError {
    /// Workout conversion errors
    #[error("Transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    /// TCX document read/write errors
    #[error("TCX error: {0}")]
    Tcx(#[from] TcxError),

    /// Workout record decoding errors
    #[error("Workout record error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while converting one workout record
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Activity label outside the supported sport table
    #[error("Unsupported activity type '{label}' for workout {workout_id}")]
    UnsupportedActivityType { workout_id: String, label: String },

    /// Output directory missing or not a directory
    #[error("Invalid output path {path} for workout {workout_id}: {reason}")]
    InvalidOutputPath {
        workout_id: String,
        path: PathBuf,
        reason: String,
    },

    /// Sampling interval of zero, or one that walks the track past the
    /// representable time range
    #[error("Invalid sampling interval of {interval_secs}s for workout {workout_id}: {reason}")]
    InvalidSamplingInterval {
        workout_id: String,
        interval_secs: u32,
        reason: String,
    },

    /// XML encoding failed
    #[error("Failed to serialize workout {workout_id}: {reason}")]
    SerializationFailed { workout_id: String, reason: String },
}

/// TCX document errors
#[derive(Debug, Error)]
pub enum TcxError {
    /// Underlying XML reader/writer failure
    #[error("XML error: {0}")]
    Xml(String),

    /// IO failure while writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required element was absent
    #[error("Missing element: {element}")]
    MissingElement { element: String },

    /// Element text could not be parsed
    #[error("Invalid value in {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl From<quick_xml::Error> for TcxError {
    fn from(err: quick_xml::Error) -> Self {
        TcxError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TcxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        TcxError::Xml(err.to_string())
    }
}

/// Result type alias for peloton-tcx operations
pub type Result<T> = std::result::Result<T, PelotonTcxError>;

impl TranscodeError {
    /// Workout the error belongs to
    pub fn workout_id(&self) -> &str {
        match self {
            TranscodeError::UnsupportedActivityType { workout_id, .. }
            | TranscodeError::InvalidOutputPath { workout_id, .. }
            | TranscodeError::InvalidSamplingInterval { workout_id, .. }
            | TranscodeError::SerializationFailed { workout_id, .. } => workout_id,
        }
    }

    /// Whether the in-memory document is still usable
    pub fn keeps_document(&self) -> bool {
        matches!(self, TranscodeError::InvalidOutputPath { .. })
    }
}

impl PelotonTcxError {
    /// Check if a batch run should skip this workout and continue
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            PelotonTcxError::Transcode(_)
                | PelotonTcxError::Json(_)
                | PelotonTcxError::Tcx(_)
                | PelotonTcxError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PelotonTcxError::Transcode(TranscodeError::UnsupportedActivityType { .. }) => {
                ErrorSeverity::Warning
            }
            PelotonTcxError::Transcode(TranscodeError::InvalidOutputPath { .. }) => {
                ErrorSeverity::Warning
            }
            PelotonTcxError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PelotonTcxError::Transcode(TranscodeError::UnsupportedActivityType {
                label, ..
            }) => {
                format!(
                    "Workouts of type '{}' cannot be converted yet; only cycling and stretching are supported.",
                    label
                )
            }
            PelotonTcxError::Transcode(TranscodeError::InvalidOutputPath { path, .. }) => {
                format!(
                    "Cannot write TCX files to {}. Please provide an existing directory.",
                    path.display()
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Stops the whole run
    Critical,
    /// Workout lost, run continues
    Error,
    /// Workout skipped or side channel failed
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = PelotonTcxError::Transcode(TranscodeError::UnsupportedActivityType {
            workout_id: "abc".to_string(),
            label: "running".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = PelotonTcxError::Configuration("bad granularity".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_skippable());
    }

    #[test]
    fn test_transcode_error_carries_workout_id() {
        let err = TranscodeError::SerializationFailed {
            workout_id: "w42".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.workout_id(), "w42");
        assert!(!err.keeps_document());
        assert!(err.to_string().contains("w42"));
    }

    #[test]
    fn test_user_messages() {
        let err = PelotonTcxError::Transcode(TranscodeError::InvalidOutputPath {
            workout_id: "w1".to_string(),
            path: PathBuf::from("/nope"),
            reason: "does not exist".to_string(),
        });
        assert!(err.user_message().contains("/nope"));
        assert!(err.is_skippable());
    }

    #[test]
    fn test_severity_maps_to_tracing_level() {
        let err = PelotonTcxError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert!(err.is_skippable());
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);

        let err = PelotonTcxError::Transcode(TranscodeError::UnsupportedActivityType {
            workout_id: "w2".to_string(),
            label: "yoga".to_string(),
        });
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);
    }
}
