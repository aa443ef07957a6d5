//! Normalised departure records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Direction, LineId};

/// Format of SL's local timestamps, e.g. `2024-03-15T10:04:00`.
const SL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The five transport-type categories in an SL departures response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportType {
    Metro,
    Bus,
    Train,
    Tram,
    Ship,
}

impl TransportType {
    /// All categories, in the order the response lists them.
    pub const ALL: [TransportType; 5] = [
        TransportType::Metro,
        TransportType::Bus,
        TransportType::Train,
        TransportType::Tram,
        TransportType::Ship,
    ];

    /// Query parameter that toggles this category in a request.
    pub fn query_param(self) -> &'static str {
        match self {
            TransportType::Metro => "metros",
            TransportType::Bus => "buses",
            TransportType::Train => "trains",
            TransportType::Tram => "trams",
            TransportType::Ship => "ships",
        }
    }
}

/// A deviation notice attached to a departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deviation {
    pub text: Option<String>,
    pub consequence: Option<String>,
    pub importance_level: Option<i64>,
}

/// One departure, normalised from any transport-type category.
///
/// Upstream values are carried as sent; a field that was missing or of
/// the wrong type is `None`. The direction may be remapped once by the
/// line filter; after the departure is placed in a station's list it is
/// not modified again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Departure {
    pub transport: TransportType,
    pub line_number: Option<LineId>,
    pub destination: Option<String>,
    pub journey_direction: Option<Direction>,
    /// Expected departure, local wall-clock time as sent by upstream.
    pub expected_date_time: Option<String>,

    pub time_tabled_date_time: Option<String>,
    pub display_time: Option<String>,
    pub transport_mode: Option<String>,
    pub group_of_line: Option<String>,
    pub stop_area_name: Option<String>,
    pub stop_area_number: Option<i64>,
    pub stop_point_number: Option<i64>,
    pub stop_point_designation: Option<String>,
    pub journey_number: Option<i64>,
    pub secondary_destination_name: Option<String>,
    pub deviations: Option<Vec<Deviation>>,
}

impl Departure {
    /// Line number for log output; empty when upstream sent none.
    pub fn line_label(&self) -> String {
        self.line_number
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Parsed expected departure time.
    ///
    /// `None` when upstream sent nothing or something that is not an SL
    /// timestamp.
    pub fn expected_at(&self) -> Option<NaiveDateTime> {
        let raw = self.expected_date_time.as_deref()?;
        NaiveDateTime::parse_from_str(raw, SL_TIMESTAMP_FORMAT).ok()
    }
}

/// Sort departures by expected time, earliest first.
///
/// The sort is stable. Unparseable timestamps sort before all others.
pub fn sort_by_expected_time(departures: &mut [Departure]) {
    departures.sort_by_key(Departure::expected_at);
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal bus departure for tests.
    pub fn departure(line: &str, direction: i64, expected: &str) -> Departure {
        Departure {
            transport: TransportType::Bus,
            line_number: Some(LineId::from(line)),
            destination: Some("Slussen".to_string()),
            journey_direction: Some(Direction::new(direction)),
            expected_date_time: Some(expected.to_string()),
            time_tabled_date_time: None,
            display_time: None,
            transport_mode: Some("BUS".to_string()),
            group_of_line: None,
            stop_area_name: None,
            stop_area_number: None,
            stop_point_number: None,
            stop_point_designation: None,
            journey_number: None,
            secondary_destination_name: None,
            deviations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::departure;
    use super::*;

    #[test]
    fn expected_at_parses_sl_timestamps() {
        let dep = departure("4", 1, "2024-03-15T10:04:00");
        let at = dep.expected_at().unwrap();
        assert_eq!(at.to_string(), "2024-03-15 10:04:00");
    }

    #[test]
    fn expected_at_tolerates_garbage() {
        let dep = departure("4", 1, "soon");
        assert!(dep.expected_at().is_none());
    }

    #[test]
    fn expected_at_without_a_time() {
        let mut dep = departure("4", 1, "");
        dep.expected_date_time = None;
        assert!(dep.expected_at().is_none());
    }

    #[test]
    fn sort_is_stable_and_ascending() {
        let mut deps = vec![
            departure("a", 1, "2024-03-15T10:10:00"),
            departure("b", 1, "2024-03-15T10:01:00"),
            departure("c", 1, "2024-03-15T10:10:00"),
            departure("d", 1, "2024-03-15T09:59:00"),
        ];
        sort_by_expected_time(&mut deps);

        let lines: Vec<String> = deps.iter().map(|d| d.line_label()).collect();
        assert_eq!(lines, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn query_params() {
        let params: Vec<&str> = TransportType::ALL.iter().map(|t| t.query_param()).collect();
        assert_eq!(params, vec!["metros", "buses", "trains", "trams", "ships"]);
    }

    #[test]
    fn serializes_with_upstream_field_names() {
        let dep = departure("4", 2, "2024-03-15T10:04:00");
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(json["LineNumber"], "4");
        assert_eq!(json["JourneyDirection"], 2);
        assert_eq!(json["ExpectedDateTime"], "2024-03-15T10:04:00");
        assert_eq!(json["Transport"], "BUS");
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let mut dep = departure("4", 2, "2024-03-15T10:04:00");
        dep.destination = None;
        let json = serde_json::to_value(&dep).unwrap();
        assert!(json["Destination"].is_null());
    }
}
