//! change_log.rs — bounded, newest-first list of change events.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::ChangeEvent;

/// Number of events retained.
pub const CHANGE_LOG_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<ChangeEvent>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `ev`, dropping the oldest entries beyond the cap.
    pub fn push_front(&mut self, ev: ChangeEvent) {
        self.entries.insert(0, ev);
        self.entries.truncate(CHANGE_LOG_CAP);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&ChangeEvent> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[ChangeEvent] {
        &self.entries
    }
}

// A hand-edited state file may carry more than the cap; clamp on load.
impl<'de> Deserialize<'de> for ChangeLog {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let mut entries = Vec::<ChangeEvent>::deserialize(de)?;
        entries.truncate(CHANGE_LOG_CAP);
        Ok(Self { entries })
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn ev(i: i64) -> ChangeEvent {
        ChangeEvent {
            name: format!("site-{i}"),
            url: format!("https://s{i}.example/"),
            timestamp: Utc::now() + Duration::seconds(i),
            change_descriptions: vec!["Content updated".into()],
        }
    }

    #[test]
    fn keeps_newest_first_and_caps_at_fifty() {
        let mut log = ChangeLog::new();
        for i in 0..120 {
            log.push_front(ev(i));
        }
        assert_eq!(log.len(), CHANGE_LOG_CAP);
        assert_eq!(log.latest().unwrap().name, "site-119");
        assert_eq!(log.as_slice().last().unwrap().name, "site-70");

        let first = log.latest().unwrap().timestamp;
        assert!(log.iter().all(|e| e.timestamp <= first));
    }

    #[test]
    fn oversized_document_is_clamped_on_load() {
        let many: Vec<ChangeEvent> = (0..75).map(ev).collect();
        let json = serde_json::to_string(&many).unwrap();
        let log: ChangeLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log.len(), CHANGE_LOG_CAP);
        assert_eq!(log.latest().unwrap().name, "site-0");
    }
}
