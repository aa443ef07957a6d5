//! SL realtime departures API response DTOs.
//!
//! These types map directly to the `realtimedeparturesV4` JSON response.
//! Display fields are optional because their presence varies between
//! transport-type categories.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Deviation, Direction, LineId, TransportType};

/// Top-level response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RealtimeResponse {
    /// Zero on success; anything else is an upstream failure.
    pub status_code: i64,

    /// Error text when `status_code` is non-zero.
    pub message: Option<String>,

    /// Server-side execution time in milliseconds.
    pub execution_time: Option<i64>,

    /// Absent on failure.
    pub response_data: Option<ResponseData>,
}

/// Departures at one site, grouped by transport type.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseData {
    /// When the realtime data was last updated upstream.
    pub latest_update: Option<String>,

    /// Seconds since `latest_update`.
    pub data_age: Option<i64>,

    #[serde(default, deserialize_with = "category_entries")]
    pub metros: Vec<RawDeparture>,

    #[serde(default, deserialize_with = "category_entries")]
    pub buses: Vec<RawDeparture>,

    #[serde(default, deserialize_with = "category_entries")]
    pub trains: Vec<RawDeparture>,

    #[serde(default, deserialize_with = "category_entries")]
    pub trams: Vec<RawDeparture>,

    #[serde(default, deserialize_with = "category_entries")]
    pub ships: Vec<RawDeparture>,
}

impl ResponseData {
    /// Entries for one transport type.
    pub fn entries(&self, transport: TransportType) -> &[RawDeparture] {
        match transport {
            TransportType::Metro => &self.metros,
            TransportType::Bus => &self.buses,
            TransportType::Train => &self.trains,
            TransportType::Tram => &self.trams,
            TransportType::Ship => &self.ships,
        }
    }
}

/// One departure entry as sent by upstream.
///
/// Every field is optional and a value of the wrong type reads as absent,
/// so a single odd entry never spoils the rest of the response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDeparture {
    #[serde(default, deserialize_with = "lenient")]
    pub line_number: Option<LineId>,
    #[serde(default, deserialize_with = "lenient")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub journey_direction: Option<Direction>,
    #[serde(default, deserialize_with = "lenient")]
    pub expected_date_time: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub transport_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub time_tabled_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub group_of_line: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_area_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_area_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_point_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_point_designation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub journey_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub secondary_destination_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub deviations: Option<Vec<Deviation>>,
}

/// Read a field, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value(value).ok())
}

/// Read a category list. `null` is empty; elements that are not objects
/// are skipped.
fn category_entries<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawDeparture>, D::Error> {
    let items = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "StatusCode": 0,
        "Message": null,
        "ExecutionTime": 12,
        "ResponseData": {
            "LatestUpdate": "2024-03-15T10:00:12",
            "DataAge": 18,
            "Metros": [{
                "TransportMode": "METRO",
                "LineNumber": "17",
                "Destination": "Åkeshov",
                "JourneyDirection": 1,
                "GroupOfLine": "tunnelbanans gröna linje",
                "DisplayTime": "3 min",
                "JourneyNumber": 20123,
                "StopAreaName": "Slussen",
                "StopAreaNumber": 1011,
                "StopPointNumber": 1051,
                "StopPointDesignation": "2",
                "TimeTabledDateTime": "2024-03-15T10:03:00",
                "ExpectedDateTime": "2024-03-15T10:03:30",
                "Deviations": null
            }],
            "Buses": [{
                "LineNumber": "4",
                "Destination": "Radiohuset",
                "JourneyDirection": 2,
                "ExpectedDateTime": "2024-03-15T10:05:00",
                "Deviations": [{"Text": "Hållplatsen flyttad", "Consequence": "INFORMATION", "ImportanceLevel": 2}]
            }],
            "Trains": [],
            "Trams": [],
            "Ships": [],
            "StopPointDeviations": []
        }
    }"#;

    #[test]
    fn parse_sample_response() {
        let resp: RealtimeResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(resp.status_code, 0);
        let data = resp.response_data.unwrap();
        assert_eq!(data.data_age, Some(18));
        assert_eq!(data.metros.len(), 1);
        assert_eq!(data.metros[0].line_number, Some(LineId::from("17")));
        assert_eq!(data.metros[0].journey_direction, Some(Direction::ONE));
        assert_eq!(data.metros[0].stop_area_number, Some(1011));
        assert_eq!(data.buses[0].deviations.as_ref().unwrap().len(), 1);
        assert!(data.trains.is_empty());
    }

    #[test]
    fn missing_categories_are_empty() {
        let json = r#"{"StatusCode": 0, "ResponseData": {"LatestUpdate": null, "DataAge": 0}}"#;
        let resp: RealtimeResponse = serde_json::from_str(json).unwrap();
        let data = resp.response_data.unwrap();
        for transport in TransportType::ALL {
            assert!(data.entries(transport).is_empty());
        }
    }

    #[test]
    fn parse_failure_response() {
        let json = r#"{"StatusCode": 1002, "Message": "Key is invalid", "ExecutionTime": 0, "ResponseData": null}"#;
        let resp: RealtimeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status_code, 1002);
        assert_eq!(resp.message.as_deref(), Some("Key is invalid"));
        assert!(resp.response_data.is_none());
    }

    #[test]
    fn odd_entry_does_not_spoil_its_neighbours() {
        let json = r#"{"StatusCode": 0, "ResponseData": {"Buses": [
            {"LineNumber": "4", "Destination": "Radiohuset", "JourneyDirection": 1, "ExpectedDateTime": "2024-03-15T10:05:00"},
            {"LineNumber": "4", "Destination": null, "JourneyDirection": "two", "ExpectedDateTime": 17, "StopPointNumber": "A"}
        ]}}"#;
        let resp: RealtimeResponse = serde_json::from_str(json).unwrap();
        let buses = resp.response_data.unwrap().buses;

        assert_eq!(buses.len(), 2);
        assert_eq!(buses[0].destination.as_deref(), Some("Radiohuset"));
        assert_eq!(buses[1].line_number, Some(LineId::from("4")));
        assert_eq!(buses[1].destination, None);
        assert_eq!(buses[1].journey_direction, None);
        assert_eq!(buses[1].expected_date_time, None);
        assert_eq!(buses[1].stop_point_number, None);
    }

    #[test]
    fn null_category_and_non_object_entries() {
        let json = r#"{"StatusCode": 0, "ResponseData": {
            "Metros": null,
            "Trams": [null, 3, {"LineNumber": 7, "JourneyDirection": 2}]
        }}"#;
        let resp: RealtimeResponse = serde_json::from_str(json).unwrap();
        let data = resp.response_data.unwrap();

        assert!(data.metros.is_empty());
        assert_eq!(data.trams.len(), 1);
        assert_eq!(data.trams[0].line_number, Some(LineId::Number(7)));
    }
}
