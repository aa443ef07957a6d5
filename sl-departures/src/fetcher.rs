//! Departures for a single station.
//!
//! One upstream request per station. Every entry of every transport type
//! is normalised, remapped, filtered and dropped into a bucket for its
//! direction. Each bucket is sorted by expected time and the buckets are
//! concatenated in direction order, so ordering holds within a direction
//! but not across the whole list.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{Config, ConfigError, StationConfig};
use crate::domain::{Departure, Direction, TransportType, sort_by_expected_time};
use crate::events::FailurePayload;
use crate::filter;
use crate::sl::{DepartureSource, ResponseData, SiteQuery, SlError, normalize};

/// Station name reported when the configuration doesn't give one.
pub const DEFAULT_STATION_NAME: &str = "NotSet";

/// Status reported for network, HTTP and decoding failures.
pub const TRANSPORT_ERROR_STATUS: i64 = 600;

/// Status reported for configuration errors.
pub const CONFIG_ERROR_STATUS: i64 = 500;

/// Departures at one station from one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDepartures {
    #[serde(rename = "StationId")]
    pub station_id: String,

    #[serde(rename = "StationName")]
    pub station_name: String,

    /// When upstream last refreshed its realtime data.
    #[serde(rename = "LatestUpdate")]
    pub latest_update: Option<String>,

    /// Seconds since `latest_update`, as reported upstream.
    #[serde(rename = "DataAge")]
    pub data_age: Option<i64>,

    /// Local time this result was captured.
    pub obtained: NaiveDateTime,

    pub departures: Vec<Departure>,
}

/// Why a station's fetch failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Upstream answered with a non-zero `StatusCode`
    #[error("station id={station_id} StatusCode: {status_code} Msg: {message}")]
    Upstream {
        station_id: String,
        status_code: i64,
        message: String,
    },

    /// Upstream could not be reached or its answer could not be read
    #[error("station id={station_id}: {source}")]
    Transport {
        station_id: String,
        #[source]
        source: SlError,
    },

    /// The station's configuration is unusable
    #[error("station id={station_id}: {source}")]
    Config {
        station_id: String,
        #[source]
        source: ConfigError,
    },
}

impl FetchError {
    /// The payload reported to the display layer.
    pub fn payload(&self) -> FailurePayload {
        match self {
            FetchError::Upstream {
                status_code,
                message,
                ..
            } => FailurePayload::new(*status_code, message.clone()),
            FetchError::Transport { source, .. } => {
                FailurePayload::new(TRANSPORT_ERROR_STATUS, source.to_string())
            }
            FetchError::Config { source, .. } => {
                FailurePayload::new(CONFIG_ERROR_STATUS, source.to_string())
            }
        }
    }
}

/// The upstream query for a station.
pub fn site_query(station: &StationConfig) -> SiteQuery {
    station
        .exclude_transport_types
        .iter()
        .fold(SiteQuery::new(station.station_id.clone()), |query, category| {
            query.exclude(category.clone())
        })
}

/// Fetch, filter and order one station's departures.
pub async fn fetch_station<S, C>(
    source: &S,
    config: &Config,
    station: &StationConfig,
    clock: &C,
) -> Result<StationDepartures, FetchError>
where
    S: DepartureSource,
    C: Clock,
{
    let station_id = &station.station_id;
    info!(station_id = %station_id, "Getting departures");

    let response = source
        .realtime_departures(&site_query(station))
        .await
        .map_err(|source| {
            warn!(station_id = %station_id, error = %source, "Problems reaching upstream");
            FetchError::Transport {
                station_id: station_id.clone(),
                source,
            }
        })?;

    if response.status_code != 0 {
        let message = response.message.unwrap_or_default();
        warn!(
            station_id = %station_id,
            status_code = response.status_code,
            message = %message,
            "Upstream reported a failure"
        );
        return Err(FetchError::Upstream {
            station_id: station_id.clone(),
            status_code: response.status_code,
            message,
        });
    }

    let data = response
        .response_data
        .ok_or_else(|| FetchError::Transport {
            station_id: station_id.clone(),
            source: SlError::Json {
                message: "response has no ResponseData".to_string(),
            },
        })?;

    let departures = collect_departures(station, config.direction, &data).map_err(|source| {
        warn!(station_id = %station_id, error = %source, "Station configuration problem");
        FetchError::Config {
            station_id: station_id.clone(),
            source,
        }
    })?;

    info!(
        station_id = %station_id,
        count = departures.len(),
        "Found departures"
    );

    Ok(StationDepartures {
        station_id: station_id.clone(),
        station_name: station
            .station_name
            .clone()
            .unwrap_or_else(|| DEFAULT_STATION_NAME.to_string()),
        latest_update: data.latest_update,
        data_age: data.data_age,
        obtained: clock.now(),
        departures,
    })
}

/// Wanted departures of a response, bucketed by direction.
///
/// Each bucket is sorted by expected time. Departures without a usable
/// direction have no bucket and are left out.
pub fn bucket_departures(
    station: &StationConfig,
    global_direction: Option<Direction>,
    data: &ResponseData,
) -> Result<BTreeMap<Direction, Vec<Departure>>, ConfigError> {
    let mut buckets: BTreeMap<Direction, Vec<Departure>> = BTreeMap::new();

    for transport in TransportType::ALL {
        for raw in data.entries(transport) {
            let Some(departure) = filter::apply(station, global_direction, normalize(transport, raw))? else {
                continue;
            };
            let Some(direction) = departure.journey_direction else {
                debug!(line = %departure.line_label(), "Dropping departure without a direction");
                continue;
            };
            buckets.entry(direction).or_default().push(departure);
        }
    }

    for bucket in buckets.values_mut() {
        sort_by_expected_time(bucket);
    }

    Ok(buckets)
}

/// Wanted departures of a response as one list, bucket after bucket.
pub fn collect_departures(
    station: &StationConfig,
    global_direction: Option<Direction>,
    data: &ResponseData,
) -> Result<Vec<Departure>, ConfigError> {
    Ok(bucket_departures(station, global_direction, data)?
        .into_values()
        .flatten()
        .collect())
}
