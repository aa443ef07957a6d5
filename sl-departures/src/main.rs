use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sl_departures::clock::LocalClock;
use sl_departures::config::Config;
use sl_departures::scheduler::Scheduler;
use sl_departures::sl::{DepartureSource, MockSlClient, SlClient, SlConfig};
use sl_departures::web::{AppState, create_router};

/// Config file path, when not given as the first argument.
const CONFIG_ENV: &str = "SL_CONFIG";

/// Serve recorded responses from this directory instead of calling SL.
const MOCK_DIR_ENV: &str = "SL_MOCK_DIR";

/// Listen address for the display endpoint.
const BIND_ENV: &str = "SL_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Batch events buffered between the scheduler and the web state.
const EVENT_BUFFER: usize = 16;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&path)?.with_env_overrides();

    init_tracing(config.debug);
    info!(path = %path, "Loaded configuration");

    let addr: SocketAddr = std::env::var(BIND_ENV)
        .unwrap_or_else(|_| DEFAULT_BIND.to_string())
        .parse()?;

    if let Ok(dir) = std::env::var(MOCK_DIR_ENV) {
        info!(dir = %dir, "Using mock SL data");
        return run(MockSlClient::new(dir)?, config, addr).await;
    }

    if config.apikey.is_empty() {
        warn!("No API key configured; upstream calls will fail");
    }

    let mut sl_config = SlConfig::new(&config.apikey, config.ssl);
    if let Some(proxy) = &config.proxy {
        sl_config = sl_config.with_proxy(proxy);
    }
    run(SlClient::new(sl_config)?, config, addr).await
}

/// `RUST_LOG` wins; otherwise `debug` in the config turns on debug output
/// for this crate.
fn init_tracing(debug: bool) {
    let default = if debug {
        "info,sl_departures=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run<S>(source: S, config: Config, addr: SocketAddr) -> Result<(), BoxError>
where
    S: DepartureSource + 'static,
{
    let state = AppState::new();
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let (stop_tx, stop_rx) = watch::channel(false);

    tokio::spawn(state.clone().follow(events_rx));

    let scheduler = Scheduler::new(
        Arc::new(source),
        Arc::new(config),
        Arc::new(LocalClock),
        events_tx,
    );
    let mut scheduler = tokio::spawn(scheduler.run(stop_rx));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Departures available on http://{addr}/departures");

    let mut server_stop = stop_tx.subscribe();
    let server = axum::serve(listener, create_router(state)).with_graceful_shutdown(async move {
        let _ = server_stop.changed().await;
    });
    let server = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut scheduler => {
            // Only a configuration error ends the scheduler on its own.
            joined??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutting down");
        }
    }

    let _ = stop_tx.send(true);
    scheduler.await??;
    server.await??;
    Ok(())
}
