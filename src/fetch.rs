// src/fetch.rs
//! Page fetch seam. The runner only sees [`PageFetcher`]; production uses
//! [`HttpFetcher`] (reqwest), tests plug in canned pages.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unreadable body: {0}")]
    Body(String),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw page markup for `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await.map_err(map_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if let Some(s) = e.status() {
        FetchError::Status(s.as_u16())
    } else {
        FetchError::Transport(e.to_string())
    }
}

// --- Test helper ---
/// Serves canned pages keyed by URL and records each call.
#[derive(Default)]
pub struct StaticFetcher {
    pages: std::sync::Mutex<std::collections::HashMap<String, Result<String, FetchError>>>,
    pub calls: std::sync::Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&self, url: &str, markup: impl Into<String>) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(markup.into()));
    }

    pub fn set_error(&self, url: &str, err: FetchError) {
        self.pages.lock().unwrap().insert(url.to_string(), Err(err));
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), tokio::time::Instant::now()));
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Transport(format!("no page for {url}"))))
    }
}
