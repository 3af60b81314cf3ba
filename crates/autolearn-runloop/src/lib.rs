//! # autolearn RunLoop
//!
//! Scheduled tasks for the monitor and orchestrator.
//!
//! Each page process owns a few fixed-interval timers and the occasional
//! one-shot delay. A timer's action runs to completion before the next tick
//! is considered, so suspension points are exactly the tick boundaries.
//!
//! - [`Timer`]: one-shot or repeating task with an explicit cancellation handle
//! - [`TimerControl`]: lets a repeating action stop its own timer
//! - [`TimerGroup`]: owns every timer of a page and cancels them together

pub mod timer;

pub use timer::{Timer, TimerControl, TimerGroup};
