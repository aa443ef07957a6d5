//! Shared state for the web layer.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::events::BatchEvent;

/// The most recent batch event, as last delivered by the scheduler.
#[derive(Clone, Default)]
pub struct AppState {
    latest: Arc<RwLock<Option<BatchEvent>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last event, if any poll has completed yet.
    pub async fn latest(&self) -> Option<BatchEvent> {
        self.latest.read().await.clone()
    }

    /// Replace the last event.
    pub async fn record(&self, event: BatchEvent) {
        *self.latest.write().await = Some(event);
    }

    /// Record every event from `events` until the channel closes.
    pub async fn follow(self, mut events: mpsc::Receiver<BatchEvent>) {
        while let Some(event) = events.recv().await {
            match &event {
                BatchEvent::Departures(stations) => {
                    let departures: usize = stations.iter().map(|s| s.departures.len()).sum();
                    info!(
                        stations = stations.len(),
                        departures, "Departures updated"
                    );
                }
                BatchEvent::ServiceFailure(payload) => {
                    warn!(
                        status_code = payload.status_code,
                        message = %payload.message,
                        "Service failure"
                    );
                }
            }
            self.record(event).await;
        }
    }
}
