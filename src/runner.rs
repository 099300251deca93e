// src/runner.rs
//! Sweep scheduler. One sweep walks every configured site in order, pausing
//! between fetches, reconciles each result into the [`SiteStore`] and
//! persists the whole state once at the end.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::TrackerConfig;
use crate::extractor;
use crate::fetch::PageFetcher;
use crate::model::{SiteConfig, SiteStatus};
use crate::persist::StateFile;
use crate::store::SiteStore;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tracker_sweeps_total", "Completed sweeps (periodic + manual).");
        describe_counter!("tracker_sites_checked_total", "Site checks attempted.");
        describe_counter!("tracker_fetch_errors_total", "Site fetches that failed.");
        describe_counter!("tracker_changes_total", "Change events appended to the log.");
        describe_counter!(
            "tracker_persist_errors_total",
            "State file writes that failed."
        );
        describe_gauge!("tracker_last_sweep_ts", "Unix ts of the last completed sweep.");
        describe_histogram!("tracker_sweep_ms", "Sweep wall time in milliseconds.");
    });
}

/// Outcome of checking one site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteCheck {
    pub name: String,
    pub url: String,
    pub status: SiteStatus,
    pub changes: Vec<String>,
    pub error: Option<String>,
}

impl SiteCheck {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub checks: Vec<SiteCheck>,
    pub persisted: bool,
}

impl SweepReport {
    pub fn failed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == SiteStatus::Error)
            .count()
    }

    pub fn changed(&self) -> usize {
        self.checks.iter().filter(|c| c.has_changes()).count()
    }
}

pub struct Runner {
    sites: Vec<SiteConfig>,
    interval: Duration,
    politeness_delay: Duration,
    store: SiteStore,
    fetcher: Arc<dyn PageFetcher>,
    state_file: StateFile,
    // Serializes snapshot + write so an older snapshot never lands last.
    persist_gate: Mutex<()>,
}

impl Runner {
    pub fn new(
        cfg: &TrackerConfig,
        store: SiteStore,
        fetcher: Arc<dyn PageFetcher>,
        state_file: StateFile,
    ) -> Self {
        Self {
            sites: cfg.sites.clone(),
            interval: cfg.interval(),
            politeness_delay: cfg.politeness_delay(),
            store,
            fetcher,
            state_file,
            persist_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SiteStore {
        &self.store
    }

    /// Fetch, extract and reconcile a single site. Failures are contained here.
    pub async fn check_site(&self, site: &SiteConfig) -> SiteCheck {
        counter!("tracker_sites_checked_total").increment(1);

        let markup = match self.fetcher.fetch(&site.url).await {
            Ok(m) => m,
            Err(e) => {
                counter!("tracker_fetch_errors_total").increment(1);
                tracing::warn!(target: "tracker", site = %site.name, url = %site.url, error = %e, "fetch failed");
                let msg = e.to_string();
                self.store.mark_error(&site.url, &msg);
                return SiteCheck {
                    name: site.name.clone(),
                    url: site.url.clone(),
                    status: SiteStatus::Error,
                    changes: Vec::new(),
                    error: Some(msg),
                };
            }
        };

        let sig = extractor::extract(&markup);
        let (changes, _checked_at) = self.store.reconcile(site, &sig);

        if changes.is_empty() {
            tracing::debug!(target: "tracker", site = %site.name, products = sig.product_count, "no change");
        } else {
            counter!("tracker_changes_total").increment(1);
            tracing::info!(target: "tracker", site = %site.name, url = %site.url, changes = ?changes, "change detected");
        }

        SiteCheck {
            name: site.name.clone(),
            url: site.url.clone(),
            status: SiteStatus::Ok,
            changes,
            error: None,
        }
    }

    /// One full pass over all sites, then stamp and persist.
    pub async fn sweep(&self) -> SweepReport {
        ensure_metrics_described();
        let started_at = Utc::now();
        let clock = std::time::Instant::now();
        tracing::info!(target: "tracker", sites = self.sites.len(), "sweep started");

        let mut checks = Vec::with_capacity(self.sites.len());
        for (i, site) in self.sites.iter().enumerate() {
            if i > 0 && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }
            checks.push(self.check_site(site).await);
        }

        let finished_at = Utc::now();
        self.store.set_last_sweep(finished_at);
        let persisted = self.persist().await;

        counter!("tracker_sweeps_total").increment(1);
        gauge!("tracker_last_sweep_ts").set(finished_at.timestamp() as f64);
        histogram!("tracker_sweep_ms").record(clock.elapsed().as_secs_f64() * 1000.0);

        let report = SweepReport {
            started_at,
            finished_at,
            checks,
            persisted,
        };
        tracing::info!(
            target: "tracker",
            checked = report.checks.len(),
            failed = report.failed(),
            changed = report.changed(),
            persisted,
            "sweep complete"
        );
        report
    }

    async fn persist(&self) -> bool {
        let _gate = self.persist_gate.lock().await;
        let snapshot = self.store.snapshot();
        match self.state_file.save(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                counter!("tracker_persist_errors_total").increment(1);
                tracing::warn!(target: "tracker", path = %self.state_file.path().display(), "persist state: {e:#}");
                false
            }
        }
    }

    /// Sweep now, then every `interval` after the previous sweep ends. Never returns.
    pub async fn run_periodic(self: Arc<Self>) {
        loop {
            self.sweep().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    pub fn spawn_periodic(self: &Arc<Self>) -> JoinHandle<()> {
        let me = Arc::clone(self);
        tokio::spawn(me.run_periodic())
    }

    /// Independent one-shot sweep; does not wait for or cancel any other.
    pub fn spawn_sweep(self: &Arc<Self>) -> JoinHandle<SweepReport> {
        let me = Arc::clone(self);
        tokio::spawn(async move { me.sweep().await })
    }
}
