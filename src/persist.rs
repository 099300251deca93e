// src/persist.rs
//! State file gateway. One pretty-printed JSON document, read once at boot
//! and replaced wholesale after every sweep.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::model::AggregateState;

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means a cold start. A corrupt one is logged and ignored.
    pub async fn load(&self) -> AggregateState {
        match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        target: "tracker",
                        path = %self.path.display(),
                        error = %e,
                        "state file unreadable, starting empty"
                    );
                    AggregateState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AggregateState::default(),
            Err(e) => {
                tracing::warn!(
                    target: "tracker",
                    path = %self.path.display(),
                    error = %e,
                    "state file read failed, starting empty"
                );
                AggregateState::default()
            }
        }
    }

    /// Write via temp file + rename so readers never see a half-written document.
    pub async fn save(&self, state: &AggregateState) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create state dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(state).context("serialize state")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}
