use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::TrackerConfig;

pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the static cadence gauges.
    pub fn init(cfg: &TrackerConfig) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        gauge!("tracker_interval_minutes").set(cfg.interval_minutes as f64);
        gauge!("tracker_sites_configured").set(cfg.sites.len() as f64);

        Ok(Self { handle })
    }

    /// `METRICS_ENABLED=1` turns the exporter on.
    pub fn enabled_from_env() -> bool {
        std::env::var(ENV_METRICS_ENABLED).ok().as_deref() == Some("1")
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
