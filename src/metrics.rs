//! Typed lookup over the label-keyed collections of a workout record
//!
//! Each collection is scanned once and every entry is tagged by kind. Unknown
//! labels are ignored and the first occurrence of a known label wins, so a
//! missing label simply leaves its slot empty.

use crate::models::{AverageSummary, Metric, Summary, WorkoutRecord};

/// Per-sample metric series the destination format carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    HeartRate,
    Cadence,
    Output,
    Speed,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::HeartRate,
        MetricKind::Cadence,
        MetricKind::Output,
        MetricKind::Speed,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Heart Rate" => Some(MetricKind::HeartRate),
            "Cadence" => Some(MetricKind::Cadence),
            "Output" => Some(MetricKind::Output),
            "Speed" => Some(MetricKind::Speed),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            MetricKind::HeartRate => 0,
            MetricKind::Cadence => 1,
            MetricKind::Output => 2,
            MetricKind::Speed => 3,
        }
    }
}

/// Whole-session totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    Distance,
    Calories,
}

impl SummaryKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Distance" => Some(SummaryKind::Distance),
            "Calories" => Some(SummaryKind::Calories),
            _ => None,
        }
    }
}

/// Whole-session averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AverageKind {
    AvgOutput,
    AvgSpeed,
}

impl AverageKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Avg Output" => Some(AverageKind::AvgOutput),
            "Avg Speed" => Some(AverageKind::AvgSpeed),
            _ => None,
        }
    }
}

/// Summary and metric values of one record, keyed by kind
#[derive(Debug, Default)]
pub struct MetricTable<'a> {
    distance: Option<f64>,
    calories: Option<f64>,
    avg_output: Option<f64>,
    avg_speed: Option<f64>,
    series: [Option<&'a Metric>; 4],
}

impl<'a> MetricTable<'a> {
    pub fn from_record(record: &'a WorkoutRecord) -> Self {
        let mut table = MetricTable::default();
        table.tag_summaries(&record.summaries);
        table.tag_averages(&record.average_summaries);
        table.tag_series(&record.metrics);
        table
    }

    fn tag_summaries(&mut self, summaries: &[Summary]) {
        for summary in summaries {
            let slot = match SummaryKind::from_label(&summary.display_name) {
                Some(SummaryKind::Distance) => &mut self.distance,
                Some(SummaryKind::Calories) => &mut self.calories,
                None => continue,
            };
            slot.get_or_insert(summary.value);
        }
    }

    fn tag_averages(&mut self, averages: &[AverageSummary]) {
        for average in averages {
            let slot = match AverageKind::from_label(&average.display_name) {
                Some(AverageKind::AvgOutput) => &mut self.avg_output,
                Some(AverageKind::AvgSpeed) => &mut self.avg_speed,
                None => continue,
            };
            slot.get_or_insert(average.value);
        }
    }

    fn tag_series(&mut self, metrics: &'a [Metric]) {
        for metric in metrics {
            if let Some(kind) = MetricKind::from_label(&metric.display_name) {
                self.series[kind.slot()].get_or_insert(metric);
            }
        }
    }

    pub fn summary(&self, kind: SummaryKind) -> Option<f64> {
        match kind {
            SummaryKind::Distance => self.distance,
            SummaryKind::Calories => self.calories,
        }
    }

    pub fn average(&self, kind: AverageKind) -> Option<f64> {
        match kind {
            AverageKind::AvgOutput => self.avg_output,
            AverageKind::AvgSpeed => self.avg_speed,
        }
    }

    pub fn series(&self, kind: MetricKind) -> Option<&'a Metric> {
        self.series[kind.slot()]
    }

    pub fn max(&self, kind: MetricKind) -> Option<f64> {
        self.series(kind).map(|m| m.max_value)
    }

    pub fn avg(&self, kind: MetricKind) -> Option<f64> {
        self.series(kind).map(|m| m.average_value)
    }

    /// Value of `kind` at sample `index`; `None` past the end of a short series
    pub fn sample(&self, kind: MetricKind, index: usize) -> Option<f64> {
        self.series(kind).and_then(|m| m.values.get(index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(summaries: Vec<Summary>, metrics: Vec<Metric>) -> WorkoutRecord {
        WorkoutRecord {
            id: "w".to_string(),
            title: String::new(),
            description: String::new(),
            fitness_discipline: "cycling".to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap(),
            data_granularity_seconds: 1,
            seconds_since_pedaling_start: vec![0, 1, 2],
            summaries,
            average_summaries: vec![Summary::new("Avg Speed", 17.2)],
            metrics,
        }
    }

    #[test]
    fn test_tags_known_labels_and_ignores_others() {
        let rec = record(
            vec![
                Summary::new("Total Output", 300.0),
                Summary::new("Distance", 9.1),
                Summary::new("Calories", 412.7),
            ],
            vec![
                Metric::new("Resistance", 60.0, 40.0, vec![40.0]),
                Metric::new("Cadence", 110.0, 85.0, vec![80.0, 90.0]),
            ],
        );
        let table = MetricTable::from_record(&rec);

        assert_eq!(table.summary(SummaryKind::Distance), Some(9.1));
        assert_eq!(table.summary(SummaryKind::Calories), Some(412.7));
        assert_eq!(table.average(AverageKind::AvgSpeed), Some(17.2));
        assert_eq!(table.average(AverageKind::AvgOutput), None);
        assert_eq!(table.max(MetricKind::Cadence), Some(110.0));
        assert!(table.series(MetricKind::HeartRate).is_none());
    }

    #[test]
    fn test_first_label_wins() {
        let rec = record(
            vec![Summary::new("Distance", 1.0), Summary::new("Distance", 2.0)],
            vec![
                Metric::new("Output", 200.0, 150.0, vec![]),
                Metric::new("Output", 999.0, 999.0, vec![]),
            ],
        );
        let table = MetricTable::from_record(&rec);
        assert_eq!(table.summary(SummaryKind::Distance), Some(1.0));
        assert_eq!(table.max(MetricKind::Output), Some(200.0));
    }

    #[test]
    fn test_sample_is_bounds_checked() {
        let rec = record(vec![], vec![Metric::new("Speed", 20.0, 15.0, vec![14.0])]);
        let table = MetricTable::from_record(&rec);
        assert_eq!(table.sample(MetricKind::Speed, 0), Some(14.0));
        assert_eq!(table.sample(MetricKind::Speed, 1), None);
        assert_eq!(table.sample(MetricKind::Cadence, 0), None);
    }

    #[test]
    fn test_metric_kind_labels() {
        for kind in MetricKind::ALL {
            let label = match kind {
                MetricKind::HeartRate => "Heart Rate",
                MetricKind::Cadence => "Cadence",
                MetricKind::Output => "Output",
                MetricKind::Speed => "Speed",
            };
            assert_eq!(MetricKind::from_label(label), Some(kind));
        }
        assert_eq!(MetricKind::from_label("heart rate"), None);
    }
}
