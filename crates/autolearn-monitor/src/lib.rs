//! # autolearn Monitor
//!
//! Runs inside a single course detail page and decides when the course is
//! finished.
//!
//! ## Layers
//!
//! - [`assess`] - pure verdict over a [`DetailSnapshot`](autolearn_protocols::DetailSnapshot)
//! - [`CompletionDetector`] - `Waiting -> Done | TimedOut` state machine with a watchdog
//! - [`DetailMonitor`] - drives the detector on a timer, publishes the
//!   completion signal and closes the page

pub mod detection;
pub mod detector;
pub mod monitor;

pub use detection::{Assessment, Layout, assess, parse_percentage};
pub use detector::{Completion, CompletionDetector, DetectorState, DetectorStep};
pub use monitor::{DetailMonitor, FinishOutcome, TickOutcome};
