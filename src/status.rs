// src/status.rs
//! Read side + refresh trigger used by the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::AggregateState;
use crate::runner::Runner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshAck {
    pub status: String,
}

impl RefreshAck {
    pub fn started() -> Self {
        Self {
            status: "refresh_started".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct StatusFacade {
    runner: Arc<Runner>,
}

impl StatusFacade {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self { runner }
    }

    /// Current in-memory state, including any sweep still in progress.
    pub fn get_status(&self) -> AggregateState {
        self.runner.store().snapshot()
    }

    /// Kick off an extra sweep in the background and return right away.
    pub fn request_refresh(&self) -> RefreshAck {
        // Detached: the handle is dropped, the sweep keeps running.
        let _ = self.runner.spawn_sweep();
        tracing::info!(target: "tracker", "manual refresh requested");
        RefreshAck::started()
    }
}
