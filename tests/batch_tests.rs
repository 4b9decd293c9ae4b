use peloton_tcx::{BatchTranscoder, TranscodeSettings, Transcoder, WorkoutRecord};
use std::path::Path;
use tempfile::tempdir;

/// Batch conversion tests: many workouts, one output directory

fn fixture_with_id(id: &str, discipline: &str) -> WorkoutRecord {
    let mut record =
        WorkoutRecord::from_file(Path::new("tests/fixtures/cycling_workout.json")).unwrap();
    record.id = id.to_string();
    record.fitness_discipline = discipline.to_string();
    record
}

#[test]
fn test_batch_writes_one_file_per_supported_workout() {
    let dir = tempdir().unwrap();
    let records: Vec<WorkoutRecord> = vec![
        fixture_with_id("ride-1", "cycling"),
        fixture_with_id("yoga-1", "yoga"),
        fixture_with_id("stretch-1", "stretching"),
        fixture_with_id("ride-2", "cycling"),
    ];

    let settings = TranscodeSettings {
        output_dir: Some(dir.path().to_path_buf()),
        ..TranscodeSettings::default()
    };
    let summary = BatchTranscoder::new(Transcoder::new(settings)).run(&records);

    assert_eq!(summary.total, 4);
    assert_eq!(summary.converted, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.failed, 1);

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["ride-1.tcx", "ride-2.tcx", "stretch-1.tcx"]);

    let failed: Vec<&str> = summary.errors().map(|e| e.workout_id()).collect();
    assert_eq!(failed, vec!["yoga-1"]);
}

#[test]
fn test_configured_granularity_overrides_record() {
    let record = fixture_with_id("ride-1", "cycling");
    assert_eq!(record.data_granularity_seconds, 5);

    let settings = TranscodeSettings {
        data_granularity_seconds: Some(1),
        ..TranscodeSettings::default()
    };
    let outcome = Transcoder::new(settings).run(&record).unwrap();
    let points = outcome.transcoded.document.trackpoints();
    assert_eq!((points[1].time - points[0].time).num_seconds(), 1);

    let outcome = Transcoder::default().run(&record).unwrap();
    let points = outcome.transcoded.document.trackpoints();
    assert_eq!((points[1].time - points[0].time).num_seconds(), 5);
    assert!(outcome.written.is_none());
}

#[test]
fn test_bad_interval_fails_only_that_workout() {
    let mut broken = fixture_with_id("ride-0", "cycling");
    broken.data_granularity_seconds = 0;
    let records = vec![broken, fixture_with_id("ride-1", "cycling")];

    let summary = BatchTranscoder::new(Transcoder::default()).run(&records);

    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
    let failed: Vec<&str> = summary.errors().map(|e| e.workout_id()).collect();
    assert_eq!(failed, vec!["ride-0"]);
}
