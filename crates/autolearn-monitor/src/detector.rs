//! Completion detector state machine.
//!
//! ```text
//! Waiting --(all units complete)--> Done
//! Waiting --(elapsed > max_wait)--> TimedOut
//! ```
//!
//! Both terminal states are absorbing: later observations are ignored.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use autolearn_config::{MarkerConfig, MonitorConfig};
use autolearn_protocols::DetailSnapshot;

use crate::detection::{Assessment, assess};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorState {
    Waiting,
    TimedOut,
    Done,
}

impl DetectorState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DetectorState::Waiting)
    }
}

/// How a course finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub requires_review: bool,
    /// Raised by the watchdog rather than by a completion marker.
    pub forced: bool,
}

/// Result of feeding one snapshot to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorStep {
    Pending(Assessment),
    Finished(Completion),
    /// The detector was already terminal.
    Idle,
}

pub struct CompletionDetector {
    state: DetectorState,
    started_at: Instant,
    max_wait: Duration,
    markers: MarkerConfig,
    threshold: f64,
}

impl CompletionDetector {
    /// Create a detector in `Waiting`, starting its watchdog now.
    pub fn new(max_wait: Duration, markers: MarkerConfig, threshold: f64) -> Self {
        Self {
            state: DetectorState::Waiting,
            started_at: Instant::now(),
            max_wait,
            markers,
            threshold,
        }
    }

    pub fn from_config(config: &MonitorConfig, markers: &MarkerConfig) -> Self {
        Self::new(config.max_wait(), markers.clone(), config.completion_threshold)
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Fire the watchdog if the ceiling has passed.
    ///
    /// A timeout is a forced completion without the review flag.
    pub fn check_watchdog(&mut self) -> Option<Completion> {
        if self.state.is_terminal() || self.elapsed() <= self.max_wait {
            return None;
        }

        warn!(
            "Course page open for {} s without completing, forcing completion",
            self.elapsed().as_secs()
        );
        self.state = DetectorState::TimedOut;
        Some(Completion {
            requires_review: false,
            forced: true,
        })
    }

    /// Assess a snapshot and transition to `Done` if every unit is complete.
    pub fn observe(&mut self, snapshot: &DetailSnapshot) -> DetectorStep {
        if self.state.is_terminal() {
            return DetectorStep::Idle;
        }

        let assessment = assess(snapshot, &self.markers, self.threshold);
        if !assessment.is_complete() {
            return DetectorStep::Pending(assessment);
        }

        debug!(
            "Course complete ({}/{} units, review: {})",
            assessment.completed, assessment.total, assessment.requires_review
        );
        self.state = DetectorState::Done;
        DetectorStep::Finished(Completion {
            requires_review: assessment.requires_review,
            forced: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolearn_protocols::UnitSnapshot;

    fn detector(max_wait: Duration) -> CompletionDetector {
        CompletionDetector::new(max_wait, MarkerConfig::default(), 95.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_label_finishes() {
        let mut d = detector(Duration::from_secs(60));
        let step = d.observe(&DetailSnapshot::single_unit(["已完成"]));

        assert_eq!(
            step,
            DetectorStep::Finished(Completion {
                requires_review: false,
                forced: false
            })
        );
        assert_eq!(d.state(), DetectorState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_stays_waiting() {
        let mut d = detector(Duration::from_secs(60));
        let snapshot = DetailSnapshot::multi_unit(vec![
            UnitSnapshot::with_status("已完成"),
            UnitSnapshot::with_progress("87%"),
        ]);

        match d.observe(&snapshot) {
            DetectorStep::Pending(a) => assert_eq!((a.completed, a.total), (1, 2)),
            other => panic!("unexpected step: {:?}", other),
        }
        assert_eq!(d.state(), DetectorState::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_fires_after_ceiling() {
        let mut d = detector(Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(d.check_watchdog().is_none());

        tokio::time::advance(Duration::from_millis(1)).await;
        let completion = d.check_watchdog().unwrap();
        assert!(completion.forced);
        assert!(!completion.requires_review);
        assert_eq!(d.state(), DetectorState::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_states_absorb() {
        let mut d = detector(Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(d.check_watchdog().is_some());

        assert_eq!(
            d.observe(&DetailSnapshot::single_unit(["已完成"])),
            DetectorStep::Idle
        );
        assert!(d.check_watchdog().is_none());
        assert_eq!(d.state(), DetectorState::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_ignores_watchdog() {
        let mut d = detector(Duration::from_secs(1));
        d.observe(&DetailSnapshot::single_unit(["成绩 88"]));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(d.check_watchdog().is_none());
        assert_eq!(d.state(), DetectorState::Done);
    }
}
