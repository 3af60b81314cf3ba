//! # autolearn Orchestrator
//!
//! Runs inside the course catalog page. Keeps the catalog marks in sync with
//! the shared handled/review sets, listens for completion signals from
//! detail pages, and opens the next eligible course while auto-run is on.
//!
//! The marking and selection rules are pure functions over a
//! [`CatalogSnapshot`](autolearn_protocols::CatalogSnapshot); the
//! [`CatalogOrchestrator`] wires them to the page, the store and the timers.

pub mod marking;
pub mod orchestrator;
pub mod selection;

pub use marking::{MarkPlan, is_redo_available, plan_marks, resolve_mark};
pub use orchestrator::{AdvanceOutcome, CatalogOrchestrator, SignalOutcome};
pub use selection::select_next;
