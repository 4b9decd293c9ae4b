use std::str::FromStr;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Activity, Lap, Namespaces, Trackpoint, TrainingCenterDatabase};
use crate::error::TcxError;

/// Parses documents written by [`super::TcxWriter`] back into the value model
pub struct TcxReader;

impl TcxReader {
    pub fn from_bytes(bytes: &[u8]) -> Result<TrainingCenterDatabase, TcxError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut builder = DocumentBuilder::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = element_name(&e);
                    builder.open(&name, &e)?;
                    path.push(name);
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    builder.open(&name, &e)?;
                    builder.close(&name)?;
                }
                Event::End(_) => {
                    if let Some(name) = path.pop() {
                        builder.close(&name)?;
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    builder.text(&path, &text)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        builder.finish()
    }

    pub fn from_str(xml: &str) -> Result<TrainingCenterDatabase, TcxError> {
        Self::from_bytes(xml.as_bytes())
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

#[derive(Default)]
struct PendingTrackpoint {
    time: Option<DateTime<Utc>>,
    heart_rate: u32,
    cadence: u32,
    speed: f64,
    watts: u32,
}

#[derive(Default)]
struct DocumentBuilder {
    namespaces: Option<Namespaces>,
    sport: Option<String>,
    id: Option<String>,
    lap: Option<Lap>,
    trackpoint: Option<PendingTrackpoint>,
}

impl DocumentBuilder {
    fn open(&mut self, name: &str, e: &BytesStart<'_>) -> Result<(), TcxError> {
        match name {
            "TrainingCenterDatabase" => {
                let mut namespaces = Namespaces::empty();
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    namespaces.set(&key, attr.unescape_value()?.into_owned());
                }
                self.namespaces = Some(namespaces);
            }
            "Activity" => {
                self.sport = Some(required_attribute(e, "Sport")?);
            }
            "Lap" => {
                let start = required_attribute(e, "StartTime")?;
                self.lap = Some(Lap::starting_at(parse_time("Lap.StartTime", &start)?));
            }
            "Trackpoint" => {
                self.trackpoint = Some(PendingTrackpoint::default());
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), TcxError> {
        if name != "Trackpoint" {
            return Ok(());
        }
        let pending = match self.trackpoint.take() {
            Some(pending) => pending,
            None => return Ok(()),
        };
        let time = pending.time.ok_or_else(|| missing("Trackpoint.Time"))?;
        let lap = self.lap.as_mut().ok_or_else(|| missing("Lap"))?;

        let mut trackpoint = Trackpoint::at(time);
        trackpoint.heart_rate = pending.heart_rate;
        trackpoint.cadence = pending.cadence;
        trackpoint.extension.speed = pending.speed;
        trackpoint.extension.watts = pending.watts;
        lap.track.push(trackpoint);
        Ok(())
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), TcxError> {
        let leaf = match path.last() {
            Some(leaf) => leaf.as_str(),
            None => return Ok(()),
        };
        let parent = path
            .len()
            .checked_sub(2)
            .and_then(|i| path.get(i))
            .map(String::as_str)
            .unwrap_or("");

        if let Some(point) = self.trackpoint.as_mut() {
            match (parent, leaf) {
                ("Trackpoint", "Time") => point.time = Some(parse_time("Trackpoint.Time", text)?),
                ("HeartRateBpm", "Value") => point.heart_rate = parse("HeartRateBpm", text)?,
                ("Trackpoint", "Cadence") => point.cadence = parse("Trackpoint.Cadence", text)?,
                ("ns3:TPX", "ns3:Speed") => point.speed = parse("ns3:Speed", text)?,
                ("ns3:TPX", "ns3:Watts") => point.watts = parse("ns3:Watts", text)?,
                _ => {}
            }
            return Ok(());
        }

        if (parent, leaf) == ("Activity", "Id") {
            self.id = Some(text.to_string());
            return Ok(());
        }

        let lap = match self.lap.as_mut() {
            Some(lap) => lap,
            None => return Ok(()),
        };
        match (parent, leaf) {
            ("Lap", "TotalTimeSeconds") => lap.total_time_seconds = parse(leaf, text)?,
            ("Lap", "DistanceMeters") => lap.distance_meters = parse(leaf, text)?,
            ("Lap", "MaximumSpeed") => lap.maximum_speed = parse(leaf, text)?,
            ("Lap", "Calories") => lap.calories = parse(leaf, text)?,
            ("AverageHeartRateBpm", "Value") => lap.average_heart_rate = parse(parent, text)?,
            ("MaximumHeartRateBpm", "Value") => lap.maximum_heart_rate = parse(parent, text)?,
            ("Lap", "Intensity") => lap.intensity = text.to_string(),
            ("Lap", "Cadence") => lap.cadence = parse("Lap.Cadence", text)?,
            ("Lap", "TriggerMethod") => lap.trigger_method = text.to_string(),
            ("ns3:LX", "ns3:AvgSpeed") => lap.extension.avg_speed = parse(leaf, text)?,
            ("ns3:LX", "ns3:MaxBikeCadence") => lap.extension.max_bike_cadence = parse(leaf, text)?,
            ("ns3:LX", "ns3:AvgWatts") => lap.extension.avg_watts = parse(leaf, text)?,
            ("ns3:LX", "ns3:MaxWatts") => lap.extension.max_watts = parse(leaf, text)?,
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<TrainingCenterDatabase, TcxError> {
        let namespaces = self
            .namespaces
            .ok_or_else(|| missing("TrainingCenterDatabase"))?;
        let sport = self.sport.ok_or_else(|| missing("Activity"))?;
        let lap = self.lap.ok_or_else(|| missing("Lap"))?;
        let id = self.id.ok_or_else(|| missing("Activity.Id"))?;

        Ok(TrainingCenterDatabase {
            namespaces,
            activity: Activity { sport, id, lap },
        })
    }
}

fn required_attribute(e: &BytesStart<'_>, name: &str) -> Result<String, TcxError> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(attr.unescape_value()?.into_owned()),
        None => Err(missing(&format!("{}@{}", element_name(e), name))),
    }
}

fn parse<T: FromStr>(field: &str, value: &str) -> Result<T, TcxError> {
    value.trim().parse().map_err(|_| TcxError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, TcxError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| TcxError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn missing(element: &str) -> TcxError {
    TcxError::MissingElement {
        element: element.to_string(),
    }
}
