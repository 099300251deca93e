// src/model.rs
//! Shared data model: site config, page signatures, per-site records and the
//! aggregate state that gets persisted and served on `/api/status`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change_log::ChangeLog;

/// Max product names kept per signature.
pub const SAMPLE_PRODUCTS_CAP: usize = 20;

/// One monitored site. Identity is the `(name, url)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
}

impl SiteConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Comparable fingerprint of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub content_hash: String,
    pub product_count: u64,
    pub sample_products: Vec<String>,
    #[serde(default)]
    pub text_length: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Ok,
    Error,
}

/// Last-known state of a site, keyed by URL in [`AggregateState::site_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub name: String,
    pub url: String,
    pub content_hash: String,
    pub product_count: u64,
    pub sample_products: Vec<String>,
    #[serde(default)]
    pub text_length: u64,
    pub last_checked_at: DateTime<Utc>,
    pub status: SiteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SiteRecord {
    /// Fresh `ok` record from a successful check.
    pub fn from_signature(site: &SiteConfig, sig: &Signature, checked_at: DateTime<Utc>) -> Self {
        Self {
            name: site.name.clone(),
            url: site.url.clone(),
            content_hash: sig.content_hash.clone(),
            product_count: sig.product_count,
            sample_products: sig.sample_products.clone(),
            text_length: sig.text_length,
            last_checked_at: checked_at,
            status: SiteStatus::Ok,
            last_error: None,
        }
    }
}

/// A detected change for one site during one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub name: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub change_descriptions: Vec<String>,
}

/// Everything the tracker knows. Unit of persistence and of the status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AggregateState {
    #[serde(default)]
    pub last_sweep_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub site_records: BTreeMap<String, SiteRecord>,
    #[serde(default)]
    pub change_log: ChangeLog,
}
