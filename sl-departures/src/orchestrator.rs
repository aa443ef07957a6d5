//! Fan-out over all configured stations.
//!
//! Every station is fetched concurrently and the batch waits for all of
//! them to settle. The batch is all-or-nothing: one failed station turns
//! the whole cycle into a single failure event.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::events::{BatchEvent, FailurePayload};
use crate::fetcher::{CONFIG_ERROR_STATUS, fetch_station};
use crate::sl::DepartureSource;

/// Run one poll cycle over every configured station.
///
/// If several stations fail, the failure of the earliest-configured one
/// is reported.
pub async fn fetch_all<S, C>(source: &S, config: &Config, clock: &C) -> BatchEvent
where
    S: DepartureSource,
    C: Clock,
{
    let stations = match config.stations() {
        Ok(stations) => stations,
        Err(e) => {
            warn!(error = %e, "Stations not defined");
            return BatchEvent::ServiceFailure(FailurePayload::new(CONFIG_ERROR_STATUS, e.to_string()));
        }
    };

    debug!(stations = stations.len(), "Fetching all stations");

    let results = join_all(
        stations
            .iter()
            .map(|station| fetch_station(source, config, station, clock)),
    )
    .await;

    let mut batch = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(departures) => batch.push(departures),
            Err(e) => {
                warn!(error = %e, "One or more stations failed");
                return BatchEvent::ServiceFailure(e.payload());
            }
        }
    }

    info!(stations = batch.len(), "All stations fetched");
    BatchEvent::Departures(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::clock::FixedClock;
    use crate::config::StationConfig;
    use crate::testing::{FakeSource, Outcome, data, monday_at, ok_response, raw};

    fn clock() -> FixedClock {
        FixedClock(monday_at(8, 0))
    }

    fn config_with(ids: &[&str]) -> Config {
        let mut config = Config::from_json("{}").unwrap();
        config.stations = Some(ids.iter().map(|id| StationConfig::new(*id)).collect());
        config
    }

    fn ok(line: &str) -> Outcome {
        Outcome::Ok(ok_response(data(vec![raw(line, 1, "2024-03-18T08:05:00")])))
    }

    #[tokio::test]
    async fn undefined_stations_fail_without_network() {
        let source = FakeSource::new();
        let config = Config::from_json("{}").unwrap();

        let event = fetch_all(&source, &config, &clock()).await;
        match event {
            BatchEvent::ServiceFailure(payload) => {
                assert_eq!(payload.status_code, 500);
                assert_eq!(payload.message, "config.stations is not defined");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn all_stations_succeed_in_config_order() {
        let source = FakeSource::new()
            .with("1", ok("a"))
            .with("2", ok("b"))
            .with("3", ok("c"));
        let config = config_with(&["3", "1", "2"]);

        let event = fetch_all(&source, &config, &clock()).await;
        let BatchEvent::Departures(batch) = event else {
            panic!("expected departures");
        };
        let ids: Vec<&str> = batch.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn one_failure_fails_the_batch() {
        let source = FakeSource::new()
            .with("1", ok("a"))
            .with("2", Outcome::Status(4001, "Site not found"))
            .with("3", ok("c"));
        let config = config_with(&["1", "2", "3"]);

        let event = fetch_all(&source, &config, &clock()).await;
        match event {
            BatchEvent::ServiceFailure(payload) => {
                assert_eq!(payload, FailurePayload::new(4001, "Site not found"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // Every station was still asked.
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn earliest_configured_failure_is_reported() {
        let source = FakeSource::new()
            .with("1", ok("a"))
            .with("2", Outcome::Transport)
            .with("3", Outcome::Status(1002, "Key is invalid"));
        let config = config_with(&["1", "2", "3"]);

        let event = fetch_all(&source, &config, &clock()).await;
        let BatchEvent::ServiceFailure(payload) = event else {
            panic!("expected failure");
        };
        assert_eq!(payload.status_code, 600);
    }

    #[tokio::test]
    async fn empty_station_list_is_an_empty_success() {
        let source = FakeSource::new();
        let config = config_with(&[]);

        let event = fetch_all(&source, &config, &clock()).await;
        assert!(matches!(event, BatchEvent::Departures(ref b) if b.is_empty()));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn stations_are_fetched_concurrently() {
        // The barrier only opens once all three requests are in flight,
        // so a sequential fan-out would never finish.
        let source = FakeSource::new()
            .with("1", ok("a"))
            .with("2", ok("b"))
            .with("3", ok("c"))
            .with_barrier(3);
        let config = config_with(&["1", "2", "3"]);

        let event = tokio::time::timeout(Duration::from_secs(5), fetch_all(&source, &config, &clock()))
            .await
            .expect("fan-out did not run concurrently");
        assert!(!event.is_failure());
    }
}
