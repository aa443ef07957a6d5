//! Adaptive poll scheduling.
//!
//! The poll interval is recomputed from wall-clock time before every
//! wait, so moving into or out of a high-frequency window takes effect
//! on the next cycle. Polls are fire-and-forget: a slow cycle can still
//! be in flight when the next one starts, and the two are not
//! coordinated.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::{Config, ConfigError};
use crate::domain::is_between;
use crate::events::BatchEvent;
use crate::orchestrator::fetch_all;
use crate::sl::DepartureSource;

/// How long to wait before the next poll, as of `now`.
///
/// The first `highUpdateInterval` window containing `now` wins, using its
/// own interval or else the shared high interval. Outside every window,
/// or without windows, the flat interval applies. A `times` value that is
/// not a list of rules is fatal.
pub fn next_update_interval(config: &Config, now: NaiveDateTime) -> Result<Duration, ConfigError> {
    let flat = config.update_interval();

    let Some(high) = &config.high_update_interval else {
        return Ok(flat);
    };

    let Some(times) = &high.times else {
        error!("highUpdateInterval.times is undefined in configuration");
        error!("Please remove the highUpdateInterval parameter if you do not use it");
        return Ok(flat);
    };

    let rules = times
        .rules()
        .map_err(|e| e.into_config_error("highUpdateInterval.times", ConfigError::TimesNotAList))?;

    let interval = rules
        .iter()
        .find(|rule| is_between(rule.days, rule.start, rule.stop, now))
        .map_or(flat, |rule| {
            rule.update_interval
                .or(high.update_interval)
                .map_or(flat, Duration::from_millis)
        });

    Ok(interval)
}

/// Drives polls of all stations on an adaptive interval.
pub struct Scheduler<S, C> {
    source: Arc<S>,
    config: Arc<Config>,
    clock: Arc<C>,
    events: mpsc::Sender<BatchEvent>,
}

impl<S, C> Scheduler<S, C>
where
    S: DepartureSource + 'static,
    C: Clock + 'static,
{
    pub fn new(
        source: Arc<S>,
        config: Arc<Config>,
        clock: Arc<C>,
        events: mpsc::Sender<BatchEvent>,
    ) -> Self {
        Self {
            source,
            config,
            clock,
            events,
        }
    }

    /// Poll immediately, then keep polling until `shutdown` changes or its
    /// sender is dropped.
    ///
    /// There is only ever one pending timer. Failed batches don't stop
    /// the loop; an unusable interval configuration does.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), ConfigError> {
        info!("Starting scheduler");

        loop {
            self.spawn_poll();

            let interval = next_update_interval(&self.config, self.clock.now())?;
            debug!(interval_ms = interval.as_millis() as u64, "Next update scheduled");

            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    info!("Scheduler stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Start one poll cycle in the background.
    pub fn spawn_poll(&self) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let config = Arc::clone(&self.config);
        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = fetch_all(source.as_ref(), &config, clock.as_ref()).await;
            if events.send(event).await.is_err() {
                warn!("Event receiver closed, dropping batch");
            }
        })
    }
}
