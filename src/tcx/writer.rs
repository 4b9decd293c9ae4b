use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rust_decimal::Decimal;

use super::{format_time, Lap, LapExtension, Trackpoint, TrainingCenterDatabase};
use crate::error::TcxError;

/// Serializes a [`TrainingCenterDatabase`] in the element order the TCX schema requires
pub struct TcxWriter;

impl TcxWriter {
    /// Indented XML with declaration
    pub fn to_bytes(doc: &TrainingCenterDatabase) -> Result<Vec<u8>, TcxError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Self::write_document(&mut writer, doc)?;
        Ok(writer.into_inner())
    }

    pub fn to_string(doc: &TrainingCenterDatabase) -> Result<String, TcxError> {
        let bytes = Self::to_bytes(doc)?;
        String::from_utf8(bytes).map_err(|err| TcxError::Xml(err.to_string()))
    }

    fn write_document<W: Write>(
        writer: &mut Writer<W>,
        doc: &TrainingCenterDatabase,
    ) -> Result<(), TcxError> {
        let mut root = BytesStart::new("TrainingCenterDatabase");
        for attribute in doc.namespaces.attributes() {
            root.push_attribute(attribute);
        }
        writer.write_event(Event::Start(root))?;
        writer.write_event(Event::Start(BytesStart::new("Activities")))?;

        let activity = &doc.activity;
        let mut start = BytesStart::new("Activity");
        start.push_attribute(("Sport", activity.sport.as_str()));
        writer.write_event(Event::Start(start))?;
        Self::write_text_element(writer, "Id", &activity.id)?;
        Self::write_lap(writer, &activity.lap)?;
        writer.write_event(Event::End(BytesEnd::new("Activity")))?;

        writer.write_event(Event::End(BytesEnd::new("Activities")))?;
        writer.write_event(Event::End(BytesEnd::new("TrainingCenterDatabase")))?;
        Ok(())
    }

    fn write_lap<W: Write>(writer: &mut Writer<W>, lap: &Lap) -> Result<(), TcxError> {
        let start_time = format_time(&lap.start_time);
        let mut start = BytesStart::new("Lap");
        start.push_attribute(("StartTime", start_time.as_str()));
        writer.write_event(Event::Start(start))?;

        Self::write_text_element(writer, "TotalTimeSeconds", &lap.total_time_seconds.to_string())?;
        Self::write_text_element(writer, "DistanceMeters", &decimal_to_string(lap.distance_meters))?;
        Self::write_text_element(writer, "MaximumSpeed", &lap.maximum_speed.to_string())?;
        Self::write_text_element(writer, "Calories", &lap.calories.to_string())?;
        Self::write_value_element(writer, "AverageHeartRateBpm", lap.average_heart_rate)?;
        Self::write_value_element(writer, "MaximumHeartRateBpm", lap.maximum_heart_rate)?;
        Self::write_text_element(writer, "Intensity", &lap.intensity)?;
        Self::write_text_element(writer, "Cadence", &lap.cadence.to_string())?;
        Self::write_text_element(writer, "TriggerMethod", &lap.trigger_method)?;

        writer.write_event(Event::Start(BytesStart::new("Track")))?;
        for trackpoint in &lap.track {
            Self::write_trackpoint(writer, trackpoint)?;
        }
        writer.write_event(Event::End(BytesEnd::new("Track")))?;

        Self::write_lap_extension(writer, &lap.extension)?;

        writer.write_event(Event::End(BytesEnd::new("Lap")))?;
        Ok(())
    }

    fn write_lap_extension<W: Write>(
        writer: &mut Writer<W>,
        extension: &LapExtension,
    ) -> Result<(), TcxError> {
        writer.write_event(Event::Start(BytesStart::new("Extensions")))?;
        writer.write_event(Event::Start(BytesStart::new("ns3:LX")))?;
        Self::write_text_element(writer, "ns3:AvgSpeed", &extension.avg_speed.to_string())?;
        Self::write_text_element(writer, "ns3:MaxBikeCadence", &extension.max_bike_cadence.to_string())?;
        Self::write_text_element(writer, "ns3:AvgWatts", &extension.avg_watts.to_string())?;
        Self::write_text_element(writer, "ns3:MaxWatts", &extension.max_watts.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("ns3:LX")))?;
        writer.write_event(Event::End(BytesEnd::new("Extensions")))?;
        Ok(())
    }

    fn write_trackpoint<W: Write>(
        writer: &mut Writer<W>,
        trackpoint: &Trackpoint,
    ) -> Result<(), TcxError> {
        writer.write_event(Event::Start(BytesStart::new("Trackpoint")))?;
        Self::write_text_element(writer, "Time", &format_time(&trackpoint.time))?;
        Self::write_value_element(writer, "HeartRateBpm", trackpoint.heart_rate)?;
        Self::write_text_element(writer, "Cadence", &trackpoint.cadence.to_string())?;

        writer.write_event(Event::Start(BytesStart::new("Extensions")))?;
        writer.write_event(Event::Start(BytesStart::new("ns3:TPX")))?;
        Self::write_text_element(writer, "ns3:Speed", &trackpoint.extension.speed.to_string())?;
        Self::write_text_element(writer, "ns3:Watts", &trackpoint.extension.watts.to_string())?;
        writer.write_event(Event::End(BytesEnd::new("ns3:TPX")))?;
        writer.write_event(Event::End(BytesEnd::new("Extensions")))?;

        writer.write_event(Event::End(BytesEnd::new("Trackpoint")))?;
        Ok(())
    }

    /// `<name><Value>v</Value></name>`, the TCX heart-rate shape
    fn write_value_element<W: Write>(
        writer: &mut Writer<W>,
        name: &str,
        value: u32,
    ) -> Result<(), TcxError> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        Self::write_text_element(writer, "Value", &value.to_string())?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn write_text_element<W: Write>(
        writer: &mut Writer<W>,
        name: &str,
        value: &str,
    ) -> Result<(), TcxError> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

fn decimal_to_string(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tcx::{Lap, TrackpointExtension};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn build_document() -> TrainingCenterDatabase {
        let start = Utc.with_ymd_and_hms(2023, 6, 10, 12, 0, 0).unwrap();
        let mut lap = Lap::starting_at(start);
        lap.total_time_seconds = 1800.0;
        lap.distance_meters = dec!(16093.440);
        lap.calories = 410;
        lap.track.push(Trackpoint {
            time: start,
            heart_rate: 128,
            cadence: 85,
            extension: TrackpointExtension { speed: 8.5, watts: 190 },
        });
        TrainingCenterDatabase::new("Biking", lap)
    }

    #[test]
    fn writes_root_with_namespaces() {
        let xml = TcxWriter::to_string(&build_document()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns=\"http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2\""));
        assert!(xml.contains("xmlns:ns3=\"http://www.garmin.com/xmlschemas/ActivityExtension/v2\""));
        assert!(xml.contains("<Activity Sport=\"Biking\">"));
        assert!(xml.contains("<Lap StartTime=\"2023-06-10T12:00:00.000Z\">"));
    }

    #[test]
    fn writes_lap_and_trackpoint_fields() {
        let xml = TcxWriter::to_string(&build_document()).unwrap();

        assert!(xml.contains("<DistanceMeters>16093.44</DistanceMeters>"));
        assert!(xml.contains("<TotalTimeSeconds>1800</TotalTimeSeconds>"));
        assert!(xml.contains("<Calories>410</Calories>"));
        assert!(xml.contains("<Intensity>Active</Intensity>"));
        assert!(xml.contains("<TriggerMethod>Manual</TriggerMethod>"));
        assert!(xml.contains("<ns3:Watts>190</ns3:Watts>"));
        assert!(xml.contains("<ns3:MaxBikeCadence>0</ns3:MaxBikeCadence>"));
        assert_eq!(xml.matches("<Trackpoint>").count(), 1);
    }

    #[test]
    fn lap_elements_follow_schema_order() {
        let xml = TcxWriter::to_string(&build_document()).unwrap();
        let order = [
            "<TotalTimeSeconds>",
            "<DistanceMeters>",
            "<MaximumSpeed>",
            "<Calories>",
            "<AverageHeartRateBpm>",
            "<MaximumHeartRateBpm>",
            "<Intensity>",
            "<TriggerMethod>",
            "<Track>",
            "<ns3:LX>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
