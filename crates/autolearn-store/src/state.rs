//! Typed access to the shared state entries.
//!
//! Every accessor degrades instead of failing: a read error or an unparsable
//! value is logged and reported as the entry's default, and a failed write is
//! logged and dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use autolearn_protocols::{CompletionEvent, CourseId};

use crate::keys::{KeySpace, StorageKey};
use crate::kv::KeyValueStore;

/// Insertion-ordered set of course ids, stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseSet(Vec<CourseId>);

impl CourseSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, id: &CourseId) -> bool {
        self.0.contains(id)
    }

    /// Insert an id; returns `false` if it was already present.
    pub fn insert(&mut self, id: CourseId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseId> {
        self.0.iter()
    }
}

impl FromIterator<CourseId> for CourseSet {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        let mut set = CourseSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Point-in-time view of every shared entry.
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub handled: CourseSet,
    pub review: CourseSet,
    pub auto_run: bool,
    pub last_opened: Option<CourseId>,
    pub pending_signal: Option<CompletionEvent>,
}

/// Typed view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
    keys: KeySpace,
}

impl StateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, keys: KeySpace) -> Self {
        Self { kv, keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub(crate) fn kv(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// Read the raw string for a key, logging failures as absent.
    pub(crate) fn read_raw(&self, key: StorageKey) -> Option<String> {
        let name = self.keys.key(key);
        match self.kv.get(&name) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read storage key {}: {}", name, e);
                None
            }
        }
    }

    /// Parse a raw stored value. `null`, `undefined` and garbage read as absent.
    pub(crate) fn parse_raw<T: DeserializeOwned>(&self, key: StorageKey, raw: &str) -> Option<T> {
        if raw == "null" || raw == "undefined" || raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<T>(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse storage key {}: {}", self.keys.key(key), e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        self.parse_raw(key, &raw)
    }

    fn write_json<T: Serialize>(&self, key: StorageKey, value: &T) -> bool {
        let name = self.keys.key(key);
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to serialize storage key {}: {}", name, e);
                return false;
            }
        };
        match self.kv.set(&name, &encoded) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write storage key {}: {}", name, e);
                false
            }
        }
    }

    /// Ids that must not be opened automatically.
    pub fn handled(&self) -> CourseSet {
        self.read_json(StorageKey::Handled).unwrap_or_default()
    }

    /// Add an id to the handled set. Writes only when the id is new; returns
    /// whether the id was newly stored.
    pub fn add_handled(&self, id: &CourseId) -> bool {
        self.add_many(StorageKey::Handled, std::slice::from_ref(id)) > 0
    }

    /// Add several ids with a single write; returns how many were stored.
    pub fn add_handled_all(&self, ids: &[CourseId]) -> usize {
        self.add_many(StorageKey::Handled, ids)
    }

    /// Ids whose completion needs a human to check an exam result.
    pub fn review(&self) -> CourseSet {
        self.read_json(StorageKey::Review).unwrap_or_default()
    }

    pub fn add_review(&self, id: &CourseId) -> bool {
        self.add_many(StorageKey::Review, std::slice::from_ref(id)) > 0
    }

    fn add_many(&self, key: StorageKey, ids: &[CourseId]) -> usize {
        let mut set: CourseSet = self.read_json(key).unwrap_or_default();
        let added = ids.iter().filter(|id| set.insert((*id).clone())).count();
        if added == 0 || !self.write_json(key, &set) {
            return 0;
        }
        debug!("Recorded {} new id(s) under {}", added, self.keys.key(key));
        added
    }

    /// Only a stored `true` enables auto-run.
    pub fn auto_run(&self) -> bool {
        self.read_json::<bool>(StorageKey::AutoRun).unwrap_or(false)
    }

    pub fn set_auto_run(&self, enabled: bool) {
        self.write_json(StorageKey::AutoRun, &enabled);
    }

    pub fn last_opened(&self) -> Option<CourseId> {
        self.read_json(StorageKey::LastOpened)
    }

    pub fn set_last_opened(&self, id: Option<&CourseId>) {
        self.write_json(StorageKey::LastOpened, &id);
    }

    /// Peek at the signal mailbox without consuming it.
    pub fn pending_signal(&self) -> Option<CompletionEvent> {
        self.read_json(StorageKey::Signal)
    }

    /// Delete every shared entry.
    pub fn reset(&self) {
        for key in StorageKey::ALL {
            let name = self.keys.key(key);
            if let Err(e) = self.kv.remove(&name) {
                warn!("Failed to remove storage key {}: {}", name, e);
            }
        }
        debug!("Storage under prefix '{}' reset", self.keys.prefix());
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            handled: self.handled(),
            review: self.review(),
            auto_run: self.auto_run(),
            last_opened: self.last_opened(),
            pending_signal: self.pending_signal(),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
