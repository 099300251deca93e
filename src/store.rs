//! store.rs — sole owner of the in-memory [`AggregateState`].
//!
//! Every mutation goes through one write guard held for a short synchronous
//! section, never across an `.await`. Concurrent sweeps therefore interleave
//! per site with last-writer-wins, and the change log stays capped.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::differ;
use crate::model::{AggregateState, ChangeEvent, Signature, SiteConfig, SiteRecord, SiteStatus};

#[derive(Debug, Clone, Default)]
pub struct SiteStore {
    inner: Arc<RwLock<AggregateState>>,
}

impl SiteStore {
    pub fn new(initial: AggregateState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AggregateState {
        self.inner.read().expect("state lock poisoned").clone()
    }

    pub fn record(&self, url: &str) -> Option<SiteRecord> {
        let g = self.inner.read().expect("state lock poisoned");
        g.site_records.get(url).cloned()
    }

    /// Diff against the stored record, overwrite it, and log an event if
    /// anything changed. Returns the change descriptions and the check time.
    ///
    /// The timestamp is taken under the write guard, so log order and
    /// record overwrites follow lock order.
    pub fn reconcile(&self, site: &SiteConfig, sig: &Signature) -> (Vec<String>, DateTime<Utc>) {
        let mut g = self.inner.write().expect("state lock poisoned");
        let checked_at = Utc::now();
        let changes = differ::diff(g.site_records.get(&site.url), sig);

        g.site_records.insert(
            site.url.clone(),
            SiteRecord::from_signature(site, sig, checked_at),
        );

        if !changes.is_empty() {
            g.change_log.push_front(ChangeEvent {
                name: site.name.clone(),
                url: site.url.clone(),
                timestamp: checked_at,
                change_descriptions: changes.clone(),
            });
        }
        (changes, checked_at)
    }

    /// Flag an existing record as failing. Signature fields and
    /// `last_checked_at` are left alone; unknown sites stay absent.
    pub fn mark_error(&self, url: &str, error: &str) -> bool {
        let mut g = self.inner.write().expect("state lock poisoned");
        match g.site_records.get_mut(url) {
            Some(rec) => {
                rec.status = SiteStatus::Error;
                rec.last_error = Some(error.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_last_sweep(&self, at: DateTime<Utc>) {
        self.inner.write().expect("state lock poisoned").last_sweep_at = Some(at);
    }
}
