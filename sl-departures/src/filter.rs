//! Per-station line and direction filtering.
//!
//! A departure is first given the chance to have its direction remapped
//! by the station's line rules, then checked against those rules and the
//! global direction filter. Acceptance always sees the remapped direction.

use tracing::debug;

use crate::config::{ConfigError, LineRule, StationConfig};
use crate::domain::{Departure, Direction};

/// Line rules of a station, or `None` if it accepts every line.
fn line_rules(station: &StationConfig) -> Result<Option<&[LineRule]>, ConfigError> {
    let Some(lines) = &station.lines else {
        return Ok(None);
    };

    lines.rules().map(Some).map_err(|e| {
        e.into_config_error(
            format!("station id={} lines", station.station_id),
            ConfigError::LinesNotAList {
                station_id: station.station_id.clone(),
            },
        )
    })
}

/// First rule naming the departure's line. A departure without a line
/// matches nothing.
fn matching_rule<'a>(rules: &'a [LineRule], departure: &Departure) -> Option<&'a LineRule> {
    let line = departure.line_number.as_ref()?;
    rules.iter().find(|rule| rule.line.matches(line))
}

/// Swap the departure's direction if its line rule asks for it.
///
/// Only the first rule for the line is consulted. Stations without a
/// usable rule list leave the departure untouched.
pub fn fix_journey_direction(station: &StationConfig, mut departure: Departure) -> Departure {
    let Some(rules) = station.lines.as_ref().and_then(|l| l.as_slice()) else {
        return departure;
    };

    if let Some(rule) = matching_rule(rules, &departure)
        && rule.swap_dir
        && let Some(direction) = departure.journey_direction
    {
        let swapped = direction.swapped();
        debug!(
            line = %departure.line_label(),
            from = %direction,
            to = %swapped,
            "Swapping direction"
        );
        departure.journey_direction = Some(swapped);
    }

    departure
}

/// Whether the station wants this line in this direction.
///
/// The first rule for the line decides; a rule without a direction takes
/// both. Lines without a rule are rejected, unless the station has no
/// rules at all.
pub fn is_wanted_line(station: &StationConfig, departure: &Departure) -> Result<bool, ConfigError> {
    let Some(rules) = line_rules(station)? else {
        return Ok(true);
    };

    Ok(match matching_rule(rules, departure) {
        Some(rule) => rule
            .direction
            .is_none_or(|dir| Some(dir) == departure.journey_direction),
        None => false,
    })
}

/// Global direction filter, independent of station.
pub fn is_wanted_direction(wanted: Option<Direction>, direction: Option<Direction>) -> bool {
    wanted.is_none_or(|w| Some(w) == direction)
}

/// Remap, then decide. Returns the departure if it is wanted.
pub fn apply(
    station: &StationConfig,
    global_direction: Option<Direction>,
    departure: Departure,
) -> Result<Option<Departure>, ConfigError> {
    let departure = fix_journey_direction(station, departure);

    if is_wanted_line(station, &departure)?
        && is_wanted_direction(global_direction, departure.journey_direction)
    {
        debug!(
            line = %departure.line_label(),
            direction = ?departure.journey_direction,
            destination = ?departure.destination,
            "Adding departure"
        );
        Ok(Some(departure))
    } else {
        Ok(None)
    }
}
