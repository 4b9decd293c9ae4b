// Library interface for peloton-tcx
// Converts source-platform workout records into Garmin TCX activity files

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod tcx;
pub mod transcode;
pub mod units;

// Re-export commonly used types for convenience
pub use models::*;
pub use batch::{BatchSummary, BatchTranscoder};
pub use config::{AppConfig, TranscodeSettings};
pub use error::{PelotonTcxError, Result, TcxError, TranscodeError};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use tcx::TrainingCenterDatabase;
pub use transcode::{TranscodeOutcome, Transcoded, Transcoder};
pub use units::{SpeedUnit, UnitPolicy};
