//! Parallel conversion of many workout records using rayon
//!
//! Each record goes through its own [`Transcoder::run`] call. A workout that
//! fails is logged and reported; the others carry on.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::TranscodeError;
use crate::models::WorkoutRecord;
use crate::transcode::{Transcoded, Transcoder};

/// Outcome for one workout in a batch
#[derive(Debug)]
pub struct WorkoutResult {
    pub workout_id: String,
    pub title: String,
    /// Converted document, absent when conversion failed
    pub transcoded: Option<Transcoded>,
    /// File written, when an output directory is configured and the write worked
    pub written: Option<PathBuf>,
    /// Conversion or write error
    pub error: Option<TranscodeError>,
}

impl WorkoutResult {
    pub fn is_converted(&self) -> bool {
        self.transcoded.is_some()
    }
}

/// Summary of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    pub written: usize,
    pub total_duration_ms: u128,
    /// Per-workout results in input order
    pub results: Vec<WorkoutResult>,
}

impl BatchSummary {
    pub fn is_fully_successful(&self) -> bool {
        self.results.iter().all(|r| r.error.is_none())
    }

    pub fn errors(&self) -> impl Iterator<Item = &TranscodeError> {
        self.results.iter().filter_map(|r| r.error.as_ref())
    }

    /// Get human-readable summary
    pub fn to_string_pretty(&self) -> String {
        format!(
            "Conversion Summary\n  \
             Workouts: {}\n  \
             Converted: {}\n  \
             Failed: {}\n  \
             Files Written: {}\n  \
             Total Time: {:.2}s",
            self.total,
            self.converted,
            self.failed,
            self.written,
            self.total_duration_ms as f64 / 1000.0,
        )
    }
}

/// Runs a [`Transcoder`] over many records
pub struct BatchTranscoder {
    transcoder: Transcoder,
    show_progress: bool,
}

impl BatchTranscoder {
    pub fn new(transcoder: Transcoder) -> Self {
        Self {
            transcoder,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, records: &[WorkoutRecord]) -> BatchSummary {
        let start = Instant::now();
        info!("Converting {} workouts", records.len());

        let progress = if self.show_progress {
            let pb = ProgressBar::new(records.len() as u64);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let results: Vec<WorkoutResult> = records
            .par_iter()
            .map(|record| {
                let result = self.convert_one(record);
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                result
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Complete");
        }

        let converted = results.iter().filter(|r| r.is_converted()).count();
        let written = results.iter().filter(|r| r.written.is_some()).count();
        let summary = BatchSummary {
            total: records.len(),
            converted,
            failed: records.len() - converted,
            written,
            total_duration_ms: start.elapsed().as_millis(),
            results,
        };

        info!(
            converted = summary.converted,
            failed = summary.failed,
            written = summary.written,
            "Batch conversion finished"
        );
        summary
    }

    fn convert_one(&self, record: &WorkoutRecord) -> WorkoutResult {
        let mut result = WorkoutResult {
            workout_id: record.id.clone(),
            title: record.title.clone(),
            transcoded: None,
            written: None,
            error: None,
        };

        match self.transcoder.run(record) {
            Ok(outcome) => {
                match outcome.written {
                    Some(Ok(path)) => result.written = Some(path),
                    Some(Err(err)) => result.error = Some(err),
                    None => {}
                }
                result.transcoded = Some(outcome.transcoded);
                debug!(workout_id = %record.id, "Workout converted");
            }
            Err(err) => {
                warn!(
                    workout_id = %record.id,
                    title = %record.title,
                    error = %err,
                    "Failed to convert workout, skipping"
                );
                result.error = Some(err);
            }
        }
        result
    }
}
