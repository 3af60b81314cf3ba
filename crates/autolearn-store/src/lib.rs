//! # autolearn Store
//!
//! Shared state for the detail-page monitor and the catalog orchestrator.
//!
//! ## Features
//!
//! - Synchronous string-valued key-value storage with memory and file backends
//! - Namespaced typed keys for the handled set, review set, auto-run flag,
//!   last-opened id and the signal mailbox
//! - Single-slot signal channel with watermark-based consumption

pub mod error;
pub mod keys;
pub mod kv;
pub mod signal;
pub mod state;

pub use error::StoreError;
pub use keys::{KeySpace, StorageKey};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use signal::{SignalChannel, SignalReceiver};
pub use state::{CourseSet, StateStore, StateSummary};
