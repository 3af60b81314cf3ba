use super::*;
use crate::error::StoreError;
use crate::kv::MemoryStore;
use std::sync::atomic::{AtomicUsize, Ordering};

fn state() -> (Arc<MemoryStore>, StateStore) {
    let kv = Arc::new(MemoryStore::new());
    let state = StateStore::new(kv.clone(), KeySpace::default());
    (kv, state)
}

/// Store whose every operation fails.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Serialization("quota".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Serialization("quota".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Serialization("quota".to_string()))
    }

    fn compare_and_swap(&self, _: &str, _: Option<&str>, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Serialization("quota".to_string()))
    }
}

/// Memory store that counts writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }

    fn compare_and_swap(&self, key: &str, expected: Option<&str>, new: &str) -> Result<bool, StoreError> {
        self.inner.compare_and_swap(key, expected, new)
    }
}

#[test]
fn test_course_set_insert_is_idempotent() {
    let mut set = CourseSet::new();
    assert!(set.insert(CourseId::new("a")));
    assert!(!set.insert(CourseId::new("a")));
    assert!(set.insert(CourseId::new("b")));
    assert_eq!(set.len(), 2);
    let ids: Vec<&str> = set.iter().map(CourseId::as_str).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_handled_set_round_trips_as_json_array() {
    let (kv, state) = state();
    assert!(state.add_handled(&CourseId::new("a1")));
    assert!(state.add_handled(&CourseId::new("b2")));

    let raw = kv.get("ct_clicked_ids_v2").unwrap().unwrap();
    assert_eq!(raw, r#"["a1","b2"]"#);
    assert!(state.handled().contains(&CourseId::new("b2")));
}

#[test]
fn test_add_handled_skips_write_for_known_id() {
    let kv = Arc::new(CountingStore::default());
    let state = StateStore::new(kv.clone(), KeySpace::default());

    assert!(state.add_handled(&CourseId::new("a")));
    assert!(!state.add_handled(&CourseId::new("a")));
    assert_eq!(state.add_handled_all(&[CourseId::new("a"), CourseId::new("b"), CourseId::new("c")]), 2);
    assert_eq!(state.add_handled_all(&[CourseId::new("c")]), 0);
    assert_eq!(kv.writes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_review_set_is_separate() {
    let (_kv, state) = state();
    state.add_review(&CourseId::new("exam"));
    assert!(state.review().contains(&CourseId::new("exam")));
    assert!(!state.handled().contains(&CourseId::new("exam")));
}

#[test]
fn test_corrupt_values_read_as_default() {
    let (kv, state) = state();
    kv.set("ct_clicked_ids_v2", "[oops").unwrap();
    kv.set("ct_auto_start_state", "\"yes\"").unwrap();
    kv.set("ct_last_clicked_id", "undefined").unwrap();

    assert!(state.handled().is_empty());
    assert!(!state.auto_run());
    assert!(state.last_opened().is_none());
}

#[test]
fn test_corrupt_handled_set_is_replaced_on_add() {
    let (kv, state) = state();
    kv.set("ct_clicked_ids_v2", "{}").unwrap();
    assert!(state.add_handled(&CourseId::new("x")));
    assert_eq!(kv.get("ct_clicked_ids_v2").unwrap().unwrap(), r#"["x"]"#);
}

#[test]
fn test_auto_run_defaults_false() {
    let (_kv, state) = state();
    assert!(!state.auto_run());
    state.set_auto_run(true);
    assert!(state.auto_run());
    state.set_auto_run(false);
    assert!(!state.auto_run());
}

#[test]
fn test_last_opened_round_trip() {
    let (kv, state) = state();
    state.set_last_opened(Some(&CourseId::new("c9")));
    assert_eq!(state.last_opened(), Some(CourseId::new("c9")));

    state.set_last_opened(None);
    assert_eq!(kv.get("ct_last_clicked_id").unwrap().as_deref(), Some("null"));
    assert!(state.last_opened().is_none());
}

#[test]
fn test_reset_removes_only_namespaced_keys() {
    let (kv, state) = state();
    state.add_handled(&CourseId::new("a"));
    state.add_review(&CourseId::new("b"));
    state.set_auto_run(true);
    state.set_last_opened(Some(&CourseId::new("a")));
    kv.set("ct_signal_next", "null").unwrap();
    kv.set("unrelated", "keep").unwrap();

    state.reset();

    assert_eq!(kv.len(), 1);
    assert_eq!(kv.get("unrelated").unwrap().as_deref(), Some("keep"));
}

#[test]
fn test_broken_store_degrades_to_defaults() {
    let state = StateStore::new(Arc::new(BrokenStore), KeySpace::default());
    assert!(state.handled().is_empty());
    assert!(!state.auto_run());
    assert!(state.pending_signal().is_none());

    // Writes are attempted and dropped without panicking
    state.set_auto_run(true);
    state.reset();
}

#[test]
fn test_failed_write_reports_nothing_added() {
    let state = StateStore::new(Arc::new(BrokenStore), KeySpace::default());
    assert!(!state.add_handled(&CourseId::new("a")));
    assert!(!state.add_review(&CourseId::new("a")));
    assert_eq!(
        state.add_handled_all(&[CourseId::new("a"), CourseId::new("b")]),
        0
    );
}

#[test]
fn test_summary() {
    let (_kv, state) = state();
    state.add_handled(&CourseId::new("a"));
    state.set_auto_run(true);

    let summary = state.summary();
    assert_eq!(summary.handled.len(), 1);
    assert!(summary.review.is_empty());
    assert!(summary.auto_run);
    assert!(summary.pending_signal.is_none());
}
