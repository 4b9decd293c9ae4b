//! Training Center XML (TCX) activity document
//!
//! The value types here describe exactly the subset of the Garmin TCX v2
//! schema the transcoder emits: one activity, one lap, one track.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

pub mod reader;
pub mod writer;

pub use reader::TcxReader;
pub use writer::TcxWriter;

/// Timestamp layout used for `Id`, `StartTime` and trackpoint `Time`
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// File extension for documents written to disk
pub const FILE_EXTENSION: &str = "tcx";

pub const SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";
pub const NS_ACTIVITY_GOALS: &str = "http://www.garmin.com/xmlschemas/ActivityGoals/v1";
pub const NS_ACTIVITY_EXTENSION: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
pub const NS_USER_PROFILE: &str = "http://www.garmin.com/xmlschemas/UserProfile/v2";
pub const NS_TRAINING_CENTER: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const NS_PROFILE_EXTENSION: &str = "http://www.garmin.com/xmlschemas/ProfileExtension/v1";

pub const INTENSITY_ACTIVE: &str = "Active";
pub const TRIGGER_MANUAL: &str = "Manual";

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Drop precision finer than [`TIME_FORMAT`] can carry
pub fn to_millis(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(3)
}

/// Root namespace and schema declarations
#[derive(Debug, Clone, PartialEq)]
pub struct Namespaces {
    pub schema_location: String,
    pub ns5: String,
    pub ns3: String,
    pub ns2: String,
    pub xmlns: String,
    pub xsi: String,
    pub ns4: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            schema_location: SCHEMA_LOCATION.to_string(),
            ns5: NS_ACTIVITY_GOALS.to_string(),
            ns3: NS_ACTIVITY_EXTENSION.to_string(),
            ns2: NS_USER_PROFILE.to_string(),
            xmlns: NS_TRAINING_CENTER.to_string(),
            xsi: NS_XSI.to_string(),
            ns4: NS_PROFILE_EXTENSION.to_string(),
        }
    }
}

impl Namespaces {
    /// Attribute name/value pairs in document order
    pub fn attributes(&self) -> [(&'static str, &str); 7] {
        [
            ("xsi:schemaLocation", self.schema_location.as_str()),
            ("xmlns:ns5", self.ns5.as_str()),
            ("xmlns:ns3", self.ns3.as_str()),
            ("xmlns:ns2", self.ns2.as_str()),
            ("xmlns", self.xmlns.as_str()),
            ("xmlns:xsi", self.xsi.as_str()),
            ("xmlns:ns4", self.ns4.as_str()),
        ]
    }

    pub(crate) fn set(&mut self, attribute: &str, value: String) {
        let slot = match attribute {
            "xsi:schemaLocation" => &mut self.schema_location,
            "xmlns:ns5" => &mut self.ns5,
            "xmlns:ns3" => &mut self.ns3,
            "xmlns:ns2" => &mut self.ns2,
            "xmlns" => &mut self.xmlns,
            "xmlns:xsi" => &mut self.xsi,
            "xmlns:ns4" => &mut self.ns4,
            _ => return,
        };
        *slot = value;
    }

    fn empty() -> Self {
        Self {
            schema_location: String::new(),
            ns5: String::new(),
            ns3: String::new(),
            ns2: String::new(),
            xmlns: String::new(),
            xsi: String::new(),
            ns4: String::new(),
        }
    }
}

/// Complete TCX document
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingCenterDatabase {
    pub namespaces: Namespaces,
    pub activity: Activity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Destination sport label, e.g. "Biking"
    pub sport: String,
    /// Activity identity; the formatted session start
    pub id: String,
    pub lap: Lap,
}

/// Whole-session lap
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub start_time: DateTime<Utc>,
    pub total_time_seconds: f64,
    /// Meters
    pub distance_meters: Decimal,
    /// Meters per second
    pub maximum_speed: f64,
    pub calories: u32,
    pub average_heart_rate: u32,
    pub maximum_heart_rate: u32,
    pub intensity: String,
    pub cadence: u32,
    pub trigger_method: String,
    pub track: Vec<Trackpoint>,
    pub extension: LapExtension,
}

/// `ns3:LX` lap extension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapExtension {
    pub avg_speed: f64,
    pub max_bike_cadence: u32,
    pub avg_watts: u32,
    pub max_watts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trackpoint {
    pub time: DateTime<Utc>,
    pub heart_rate: u32,
    pub cadence: u32,
    pub extension: TrackpointExtension,
}

/// `ns3:TPX` trackpoint extension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackpointExtension {
    /// Meters per second
    pub speed: f64,
    pub watts: u32,
}

impl Trackpoint {
    /// Trackpoint at `time` with every sensor field zeroed
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            time: to_millis(time),
            heart_rate: 0,
            cadence: 0,
            extension: TrackpointExtension::default(),
        }
    }
}

impl Lap {
    /// Lap starting at `start_time` with all measured fields zeroed
    pub fn starting_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time: to_millis(start_time),
            total_time_seconds: 0.0,
            distance_meters: Decimal::ZERO,
            maximum_speed: 0.0,
            calories: 0,
            average_heart_rate: 0,
            maximum_heart_rate: 0,
            intensity: INTENSITY_ACTIVE.to_string(),
            cadence: 0,
            trigger_method: TRIGGER_MANUAL.to_string(),
            track: Vec::new(),
            extension: LapExtension::default(),
        }
    }
}

impl TrainingCenterDatabase {
    /// Single-activity document with the standard Garmin namespaces
    pub fn new(sport: impl Into<String>, lap: Lap) -> Self {
        Self {
            namespaces: Namespaces::default(),
            activity: Activity {
                sport: sport.into(),
                id: format_time(&lap.start_time),
                lap,
            },
        }
    }

    pub fn trackpoints(&self) -> &[Trackpoint] {
        &self.activity.lap.track
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::error::TcxError> {
        TcxWriter::to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::TcxError> {
        TcxReader::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_time_format_has_milliseconds() {
        let t = Utc.with_ymd_and_hms(2021, 1, 5, 18, 30, 7).unwrap();
        assert_eq!(format_time(&t), "2021-01-05T18:30:07.000Z");
    }

    #[test]
    fn test_sub_millisecond_precision_is_dropped() {
        let t = Utc
            .with_ymd_and_hms(2021, 1, 5, 18, 30, 7)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let lap = Lap::starting_at(t);
        assert_eq!(lap.start_time.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(Trackpoint::at(t).time, lap.start_time);
        assert_eq!(format_time(&lap.start_time), "2021-01-05T18:30:07.123Z");
    }

    #[test]
    fn test_new_document_uses_start_as_id() {
        let t = Utc.with_ymd_and_hms(2021, 1, 5, 18, 30, 7).unwrap();
        let doc = TrainingCenterDatabase::new("Biking", Lap::starting_at(t));
        assert_eq!(doc.activity.id, "2021-01-05T18:30:07.000Z");
        assert_eq!(doc.activity.lap.intensity, "Active");
        assert_eq!(doc.activity.lap.trigger_method, "Manual");
        assert_eq!(doc.namespaces.xmlns, NS_TRAINING_CENTER);
    }

    #[test]
    fn test_namespace_attribute_order() {
        let names: Vec<&str> = Namespaces::default()
            .attributes()
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            names,
            vec![
                "xsi:schemaLocation",
                "xmlns:ns5",
                "xmlns:ns3",
                "xmlns:ns2",
                "xmlns",
                "xmlns:xsi",
                "xmlns:ns4"
            ]
        );
    }
}
