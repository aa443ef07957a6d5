//! The seam between the station fetcher and the upstream API.

use std::future::Future;

use crate::domain::TransportType;

use super::error::SlError;
use super::types::RealtimeResponse;

/// Look-back/look-ahead window requested for every station, in minutes.
pub const TIME_WINDOW_MINS: u16 = 60;

/// Parameters of one realtime-departures request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteQuery {
    pub site_id: String,
    pub time_window_mins: u16,
    /// Category parameters sent as `false`, e.g. `buses`.
    pub excluded: Vec<String>,
}

impl SiteQuery {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            time_window_mins: TIME_WINDOW_MINS,
            excluded: Vec::new(),
        }
    }

    /// Disable a transport-type category by its query parameter name.
    pub fn exclude(mut self, category: impl Into<String>) -> Self {
        self.excluded.push(category.into());
        self
    }

    /// Whether `transport` has been disabled in this query.
    pub fn excludes(&self, transport: TransportType) -> bool {
        self.excluded.iter().any(|e| e == transport.query_param())
    }

    /// Query parameters, excluding the API key.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("siteid".to_string(), self.site_id.clone()),
            ("timewindow".to_string(), self.time_window_mins.to_string()),
        ];
        for category in &self.excluded {
            params.push((category.clone(), "false".to_string()));
        }
        params
    }
}

/// Something that can answer realtime-departure queries.
///
/// Implemented by the HTTP client and by the file-backed mock, so the
/// fetch pipeline can run without network access.
pub trait DepartureSource: Send + Sync {
    fn realtime_departures(
        &self,
        query: &SiteQuery,
    ) -> impl Future<Output = Result<RealtimeResponse, SlError>> + Send;
}
