//! # autolearn Protocols
//!
//! Shared types and host-facing traits for the autolearn course-automation
//! helper. Contains no scheduling or storage logic.
//!
//! ## Core Traits
//!
//! - [`DetailPage`] - A single course page the monitor watches
//! - [`CatalogPage`] - The course list the orchestrator drives
//! - [`Notifier`] - The transient status banner
//! - [`Clock`] - Epoch-millisecond time source for signal timestamps

pub mod clock;
pub mod error;
pub mod notify;
pub mod page;
pub mod snapshot;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::PageError;
pub use notify::{LogNotifier, Notifier};
pub use page::{CatalogPage, DetailPage};
pub use snapshot::{
    CatalogItem, CatalogSnapshot, DetailSnapshot, PageKind, PageSummary, UnitSnapshot,
};
pub use types::{CompletionEvent, CourseId, ItemMark, Notice, SignalAction};
