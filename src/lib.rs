// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod change_log;
pub mod config;
pub mod differ;
pub mod extractor;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod persist;
pub mod runner;
pub mod status;
pub mod store;

use std::sync::Arc;

use tracing::info;

pub use crate::api::router;
pub use crate::config::TrackerConfig;
pub use crate::runner::{Runner, SweepReport};
pub use crate::status::StatusFacade;

use crate::fetch::PageFetcher;
use crate::persist::StateFile;
use crate::store::SiteStore;

/// Wired-up engine: runner plus the facade the HTTP layer reads from.
#[derive(Clone)]
pub struct Tracker {
    pub runner: Arc<Runner>,
    pub facade: StatusFacade,
}

impl Tracker {
    /// Load persisted state (once) and build the runner around `fetcher`.
    pub async fn load(cfg: &TrackerConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let state_file = StateFile::new(&cfg.state_path);
        let initial = state_file.load().await;
        info!(
            target: "tracker",
            path = %state_file.path().display(),
            sites = initial.site_records.len(),
            changes = initial.change_log.len(),
            "state loaded"
        );

        let runner = Arc::new(Runner::new(cfg, SiteStore::new(initial), fetcher, state_file));
        let facade = StatusFacade::new(Arc::clone(&runner));
        Self { runner, facade }
    }

    pub fn router(&self) -> axum::Router {
        api::router(self.facade.clone())
    }
}
