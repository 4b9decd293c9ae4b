//! Workout record to TCX conversion
//!
//! A [`Transcoder`] is stateless apart from its settings; every call builds a
//! fresh document from the immutable record, so one instance can serve many
//! threads at once.

use chrono::Duration;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::TranscodeSettings;
use crate::error::TranscodeError;
use crate::metrics::{AverageKind, MetricKind, MetricTable, SummaryKind};
use crate::models::{ActivityType, WorkoutRecord};
use crate::tcx::{to_millis, Lap, Trackpoint, TrainingCenterDatabase, FILE_EXTENSION};
use crate::units::{miles_to_meters, UnitPolicy};

/// A converted workout: the document and its serialized form
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub workout_id: String,
    pub document: TrainingCenterDatabase,
    pub bytes: Vec<u8>,
}

impl Transcoded {
    /// Write the serialized document to `<dir>/<workout id>.tcx`
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, TranscodeError> {
        let invalid = |reason: String| TranscodeError::InvalidOutputPath {
            workout_id: self.workout_id.clone(),
            path: dir.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(dir).map_err(|err| invalid(err.to_string()))?;
        if !metadata.is_dir() {
            return Err(invalid("not a directory".to_string()));
        }

        let path = dir.join(format!("{}.{}", self.workout_id, FILE_EXTENSION));
        fs::write(&path, &self.bytes).map_err(|err| invalid(err.to_string()))?;
        debug!(workout_id = %self.workout_id, path = %path.display(), "Wrote TCX file");
        Ok(path)
    }
}

/// Result of [`Transcoder::run`]
///
/// `written` is `None` when no output directory is configured. A failed write
/// leaves `transcoded` intact.
#[derive(Debug)]
pub struct TranscodeOutcome {
    pub transcoded: Transcoded,
    pub written: Option<Result<PathBuf, TranscodeError>>,
}

/// Converts workout records into TCX documents
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    settings: TranscodeSettings,
}

impl Transcoder {
    pub fn new(settings: TranscodeSettings) -> Self {
        Self { settings }
    }

    fn units(&self) -> &UnitPolicy {
        &self.settings.units
    }

    /// Convert with the configured interval and write to the configured
    /// directory, if any.
    pub fn run(&self, record: &WorkoutRecord) -> Result<TranscodeOutcome, TranscodeError> {
        let interval = self
            .settings
            .data_granularity_seconds
            .unwrap_or(record.data_granularity_seconds);
        let transcoded = self.transcode(record, interval)?;

        let written = self.settings.output_dir.as_deref().map(|dir| {
            let result = transcoded.write_to_dir(dir);
            if let Err(err) = &result {
                warn!(workout_id = %record.id, error = %err, "Failed to write TCX file");
            }
            result
        });

        Ok(TranscodeOutcome { transcoded, written })
    }

    /// Build and serialize the TCX document for one workout
    ///
    /// `sampling_interval_secs` is the spacing between consecutive trackpoints
    /// and must be at least one second.
    pub fn transcode(
        &self,
        record: &WorkoutRecord,
        sampling_interval_secs: u32,
    ) -> Result<Transcoded, TranscodeError> {
        let document = self.build_document(record, sampling_interval_secs)?;
        let bytes = document
            .to_bytes()
            .map_err(|err| TranscodeError::SerializationFailed {
                workout_id: record.id.clone(),
                reason: err.to_string(),
            })?;

        info!(
            workout_id = %record.id,
            title = %record.title,
            sport = %document.activity.sport,
            trackpoints = document.trackpoints().len(),
            "Converted workout to TCX"
        );

        Ok(Transcoded {
            workout_id: record.id.clone(),
            document,
            bytes,
        })
    }

    /// Build the in-memory document without serializing it
    pub fn build_document(
        &self,
        record: &WorkoutRecord,
        sampling_interval_secs: u32,
    ) -> Result<TrainingCenterDatabase, TranscodeError> {
        let activity_type = ActivityType::from_label(&record.fitness_discipline).ok_or_else(|| {
            TranscodeError::UnsupportedActivityType {
                workout_id: record.id.clone(),
                label: record.fitness_discipline.clone(),
            }
        })?;

        let invalid_interval = |reason: &str| TranscodeError::InvalidSamplingInterval {
            workout_id: record.id.clone(),
            interval_secs: sampling_interval_secs,
            reason: reason.to_string(),
        };
        if sampling_interval_secs == 0 {
            return Err(invalid_interval("interval must be at least one second"));
        }

        let table = MetricTable::from_record(record);
        let mut lap = self.summarize(record, &table);
        lap.track = self
            .build_track(record, &table, sampling_interval_secs)
            .ok_or_else(|| invalid_interval("track runs past the representable time range"))?;

        Ok(TrainingCenterDatabase::new(activity_type.sport(), lap))
    }

    fn summarize(&self, record: &WorkoutRecord, table: &MetricTable<'_>) -> Lap {
        let units = self.units();
        let mut lap = Lap::starting_at(record.start_time);

        let elapsed = record.end_time - record.start_time;
        lap.total_time_seconds = elapsed.num_milliseconds() as f64 / 1000.0;
        lap.distance_meters = table
            .summary(SummaryKind::Distance)
            .map(miles_to_meters)
            .unwrap_or_default();
        lap.calories = whole(table.summary(SummaryKind::Calories));

        lap.maximum_speed = table
            .max(MetricKind::Speed)
            .map(|v| units.max_speed.to_meters_per_second(v))
            .unwrap_or(0.0);
        lap.maximum_heart_rate = whole(table.max(MetricKind::HeartRate));
        lap.average_heart_rate = whole(table.avg(MetricKind::HeartRate));
        lap.cadence = whole(table.avg(MetricKind::Cadence));
        lap.extension.max_bike_cadence = whole(table.max(MetricKind::Cadence));
        lap.extension.max_watts = whole(table.max(MetricKind::Output));

        lap.extension.avg_watts = whole(table.average(AverageKind::AvgOutput));
        lap.extension.avg_speed = table
            .average(AverageKind::AvgSpeed)
            .map(|v| units.avg_speed.to_meters_per_second(v))
            .unwrap_or(0.0);

        lap
    }

    fn build_track(
        &self,
        record: &WorkoutRecord,
        table: &MetricTable<'_>,
        sampling_interval_secs: u32,
    ) -> Option<Vec<Trackpoint>> {
        let step = Duration::seconds(i64::from(sampling_interval_secs));
        let sample_speed = self.units().sample_speed;
        let count = record.sample_count();

        for kind in MetricKind::ALL {
            if let Some(series) = table.series(kind) {
                if series.values.len() < count {
                    debug!(
                        workout_id = %record.id,
                        metric = %series.display_name,
                        samples = series.values.len(),
                        expected = count,
                        "Metric series shorter than reference; padding with zeros"
                    );
                }
            }
        }

        let mut track = Vec::with_capacity(count);
        let mut time = to_millis(record.start_time);
        for index in 0..count {
            if index > 0 {
                time = time.checked_add_signed(step)?;
            }
            let mut point = Trackpoint::at(time);
            point.heart_rate = whole(table.sample(MetricKind::HeartRate, index));
            point.cadence = whole(table.sample(MetricKind::Cadence, index));
            point.extension.watts = whole(table.sample(MetricKind::Output, index));
            point.extension.speed = table
                .sample(MetricKind::Speed, index)
                .map(|v| sample_speed.to_meters_per_second(v))
                .unwrap_or(0.0);
            track.push(point);
        }
        Some(track)
    }
}

/// Truncate toward zero; absent, negative or NaN values become 0
fn whole(value: Option<f64>) -> u32 {
    value.map(|v| v as u32).unwrap_or(0)
}
