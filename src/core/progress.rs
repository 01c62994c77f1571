use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::core::{EngineError, EngineResult, PersistenceStore};
use crate::video::MediaElement;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(rename = "progress")]
    pub position: f64,
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

/// Identity key to last known position, serialized as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap {
    entries: BTreeMap<String, ProgressEntry>,
}

impl ProgressMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ProgressEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or refreshes `key`, first evicting the least recently updated
    /// entries so the map never holds more than `capacity` items.
    pub fn insert_bounded(&mut self, key: &str, entry: ProgressEntry, capacity: usize) {
        if !self.entries.contains_key(key) {
            while !self.entries.is_empty() && self.entries.len() >= capacity {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_updated)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(oldest) => {
                        log::debug!("Evicting progress entry for {}", oldest);
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        if capacity > 0 {
            self.entries.insert(key.to_string(), entry);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreOutcome {
    pub position: f64,
    pub notify: bool,
}

/// Bounded per-video playback positions backed by the persistence store.
pub struct ProgressCache {
    store: Rc<dyn PersistenceStore>,
    key: String,
    capacity: usize,
    notice_threshold: f64,
}

impl ProgressCache {
    pub fn new(store: Rc<dyn PersistenceStore>, key: &str, capacity: usize, notice_threshold: f64) -> Self {
        Self {
            store,
            key: key.to_string(),
            capacity,
            notice_threshold,
        }
    }

    /// Reads the whole map. Missing or malformed data reads as empty.
    pub fn load(&self) -> ProgressMap {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ProgressMap::default(),
            Err(e) => {
                log::warn!("Progress map read failed: {}", e);
                return ProgressMap::default();
            }
        };

        match serde_json::from_str::<ProgressMap>(&raw) {
            Ok(map) => map,
            Err(e) => {
                let err = EngineError::PersistenceRead {
                    key: self.key.clone(),
                    reason: e.to_string(),
                };
                log::warn!("{}, treating progress map as empty", err);
                ProgressMap::default()
            }
        }
    }

    pub fn stored_position(&self, identity: &str) -> Option<f64> {
        self.load().get(identity).map(|entry| entry.position)
    }

    /// Stored position for `identity`, or `live` when none is stored.
    pub fn position_for(&self, identity: &str, live: f64) -> f64 {
        self.stored_position(identity).unwrap_or(live)
    }

    pub fn record(&self, identity: &str, position: f64, now: DateTime<Utc>) -> EngineResult<()> {
        let mut map = self.load();
        map.insert_bounded(
            identity,
            ProgressEntry {
                position,
                last_updated: now,
            },
            self.capacity,
        );

        let serialized = serde_json::to_string(&map)?;
        self.store.set(&self.key, &serialized)
    }

    /// Seeks `element` to its stored position. Missing, zero or NaN positions
    /// leave the element where it is.
    pub fn restore(&self, identity: &str, element: &dyn MediaElement) -> Option<RestoreOutcome> {
        let position = self.stored_position(identity)?;
        if position.is_nan() || position == 0.0 {
            return None;
        }

        element.set_current_time(position);
        log::info!("Restored {} to {:.1}s", identity, position);
        Some(RestoreOutcome {
            position,
            notify: position > self.notice_threshold,
        })
    }
}
