use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Activity types that can be converted to the destination format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Cycling,
    Stretching,
}

impl ActivityType {
    /// Map a source fitness-discipline label, `None` when unsupported
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "cycling" => Some(ActivityType::Cycling),
            "stretching" => Some(ActivityType::Stretching),
            _ => None,
        }
    }

    /// Sport attribute used by the destination activity
    pub fn sport(&self) -> &'static str {
        match self {
            ActivityType::Cycling => "Biking",
            ActivityType::Stretching => "Other",
        }
    }
}

/// Session-level summary value such as total distance or calories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub display_name: String,
    #[serde(default)]
    pub display_unit: String,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub value: f64,
    #[serde(default)]
    pub slug: String,
}

impl Summary {
    pub fn new(display_name: impl Into<String>, value: f64) -> Self {
        Self {
            display_name: display_name.into(),
            display_unit: String::new(),
            value,
            slug: String::new(),
        }
    }
}

/// Whole-session averages share the summary layout
pub type AverageSummary = Summary;

/// Per-sample sensor series plus its session maximum and average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub display_name: String,
    #[serde(default)]
    pub display_unit: String,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub max_value: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub average_value: f64,
    /// One value per sample; dropped samples arrive as `null` and read as 0
    #[serde(default, deserialize_with = "nullable_values")]
    pub values: Vec<f64>,
    #[serde(default)]
    pub slug: String,
}

impl Metric {
    pub fn new(display_name: impl Into<String>, max_value: f64, average_value: f64, values: Vec<f64>) -> Self {
        Self {
            display_name: display_name.into(),
            display_unit: String::new(),
            max_value,
            average_value,
            values,
            slug: String::new(),
        }
    }
}

fn nullable_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn nullable_values<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// One completed workout as fetched from the source platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Opaque workout identifier, also used as the output file stem
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Source activity label, e.g. "cycling"
    pub fitness_discipline: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub start_time: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub end_time: DateTime<Utc>,

    /// Seconds between consecutive samples in the metric arrays
    #[serde(default = "default_granularity")]
    pub data_granularity_seconds: u32,

    /// Reference array; only its length matters
    #[serde(default)]
    pub seconds_since_pedaling_start: Vec<u32>,

    #[serde(default)]
    pub summaries: Vec<Summary>,

    #[serde(default)]
    pub average_summaries: Vec<AverageSummary>,

    #[serde(default)]
    pub metrics: Vec<Metric>,
}

fn default_granularity() -> u32 {
    1
}

impl WorkoutRecord {
    /// Number of samples the destination track must carry
    pub fn sample_count(&self) -> usize {
        self.seconds_since_pedaling_start.len()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}
