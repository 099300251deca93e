// src/differ.rs
//! Compares a fresh signature with the stored record of the same site.

use crate::model::{Signature, SiteRecord};

pub const CONTENT_UPDATED: &str = "Content updated";

/// Human-readable change descriptions, content check first, then count.
///
/// A site without a previous record yields nothing: there is no baseline yet.
pub fn diff(previous: Option<&SiteRecord>, current: &Signature) -> Vec<String> {
    let Some(prev) = previous else {
        return Vec::new();
    };

    let mut changes = Vec::new();
    if prev.content_hash != current.content_hash {
        changes.push(CONTENT_UPDATED.to_string());
    }

    let delta = current.product_count as i64 - prev.product_count as i64;
    if delta > 0 {
        changes.push(format!("{delta} new product(s) added"));
    } else if delta < 0 {
        changes.push(format!("{} product(s) removed", delta.unsigned_abs()));
    }
    changes
}
