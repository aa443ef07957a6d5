//! Test fixtures shared across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Barrier;

use crate::domain::{Direction, LineId};
use crate::sl::{DepartureSource, RawDeparture, RealtimeResponse, ResponseData, SiteQuery, SlError};

/// 2024-03-18 was a Monday.
pub(crate) fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 18)
        .unwrap()
        .and_hms_opt(hour, minute, 30)
        .unwrap()
}

/// 2024-03-16 was a Saturday.
pub(crate) fn saturday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 16)
        .unwrap()
        .and_hms_opt(hour, minute, 30)
        .unwrap()
}

pub(crate) fn raw(line: &str, direction: i64, expected: &str) -> RawDeparture {
    RawDeparture {
        line_number: Some(LineId::from(line)),
        destination: Some(format!("Destination {line}")),
        journey_direction: Some(Direction::new(direction)),
        expected_date_time: Some(expected.to_string()),
        ..RawDeparture::default()
    }
}

pub(crate) fn data(buses: Vec<RawDeparture>) -> ResponseData {
    ResponseData {
        latest_update: Some("2024-03-18T08:00:00".to_string()),
        data_age: Some(12),
        buses,
        ..ResponseData::default()
    }
}

pub(crate) fn ok_response(data: ResponseData) -> RealtimeResponse {
    RealtimeResponse {
        status_code: 0,
        message: None,
        execution_time: Some(3),
        response_data: Some(data),
    }
}

/// What the fake upstream answers for one site.
pub(crate) enum Outcome {
    Ok(RealtimeResponse),
    Status(i64, &'static str),
    Transport,
}

/// Scripted upstream that records every query it sees.
#[derive(Default)]
pub(crate) struct FakeSource {
    outcomes: HashMap<String, Outcome>,
    queries: Mutex<Vec<SiteQuery>>,
    calls: AtomicUsize,
    barrier: Option<Arc<Barrier>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, site_id: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(site_id.to_string(), outcome);
        self
    }

    /// Hold every request until `n` requests are in flight at once.
    pub(crate) fn with_barrier(mut self, n: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(n)));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> Vec<SiteQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl DepartureSource for FakeSource {
    async fn realtime_departures(&self, query: &SiteQuery) -> Result<RealtimeResponse, SlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        match self.outcomes.get(&query.site_id) {
            Some(Outcome::Ok(response)) => Ok(response.clone()),
            Some(Outcome::Status(code, message)) => Ok(RealtimeResponse {
                status_code: *code,
                message: Some((*message).to_string()),
                execution_time: None,
                response_data: None,
            }),
            Some(Outcome::Transport) | None => Err(SlError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            }),
        }
    }
}
