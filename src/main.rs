//! Stock Tracker — Binary Entrypoint
//! Loads config and persisted state, starts the sweep loop and serves the
//! status API via Shuttle.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_tracker::fetch::HttpFetcher;
use stock_tracker::metrics::Metrics;
use stock_tracker::{Tracker, TrackerConfig};

/// Compact logs by default, JSON lines with TRACKER_LOG_JSON=1.
/// `try_init` keeps this a no-op if the runtime already installed a subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_tracker=info,tracker=info,warn"));

    let json = std::env::var("TRACKER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::load_default().context("load tracker config")?;
    tracing::info!(
        target: "tracker",
        sites = cfg.sites.len(),
        interval_minutes = cfg.interval_minutes,
        politeness_delay_secs = cfg.politeness_delay_secs,
        "config loaded"
    );

    // Recorder goes in before the first sweep so its counters are kept.
    let metrics = if Metrics::enabled_from_env() {
        Some(Metrics::init(&cfg)?)
    } else {
        None
    };

    let fetcher = HttpFetcher::new(cfg.fetch_timeout(), &cfg.user_agent)?;
    let tracker = Tracker::load(&cfg, Arc::new(fetcher)).await;

    // Cold start: first sweep runs immediately inside the periodic task.
    tracker.runner.spawn_periodic();

    let mut router = tracker.router();
    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
