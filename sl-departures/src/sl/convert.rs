//! Conversion from SL DTOs to domain departures.

use crate::domain::{Departure, TransportType};

use super::types::RawDeparture;

/// Normalise one raw entry into a [`Departure`].
///
/// Never fails: whatever upstream supplied is carried over as-is, and
/// fields it omitted or garbled stay empty.
pub fn normalize(transport: TransportType, raw: &RawDeparture) -> Departure {
    Departure {
        transport,
        line_number: raw.line_number.clone(),
        destination: raw.destination.clone(),
        journey_direction: raw.journey_direction,
        expected_date_time: raw.expected_date_time.clone(),
        time_tabled_date_time: raw.time_tabled_date_time.clone(),
        display_time: raw.display_time.clone(),
        transport_mode: raw.transport_mode.clone(),
        group_of_line: raw.group_of_line.clone(),
        stop_area_name: raw.stop_area_name.clone(),
        stop_area_number: raw.stop_area_number,
        stop_point_number: raw.stop_point_number,
        stop_point_designation: raw.stop_point_designation.clone(),
        journey_number: raw.journey_number,
        secondary_destination_name: raw.secondary_destination_name.clone(),
        deviations: raw.deviations.clone(),
    }
}
