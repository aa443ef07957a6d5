//! Events delivered to the display layer, one per poll cycle.

use serde::Serialize;

use crate::fetcher::StationDepartures;

/// Error payload of a failed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailurePayload {
    pub status_code: i64,
    pub message: String,
}

impl FailurePayload {
    pub fn new(status_code: i64, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

/// Outcome of one poll cycle across all stations.
///
/// Serialised with the notification names the display module listens for.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "notification", content = "payload")]
pub enum BatchEvent {
    /// Every station succeeded; one entry per station, in configuration order.
    #[serde(rename = "DEPARTURES")]
    Departures(Vec<StationDepartures>),

    /// At least one station failed; no departures are delivered.
    #[serde(rename = "SERVICE_FAILURE")]
    ServiceFailure(FailurePayload),
}

impl BatchEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, BatchEvent::ServiceFailure(_))
    }
}
