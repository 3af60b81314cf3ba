//! Detail-page monitor.
//!
//! Polls the page, feeds snapshots to the [`CompletionDetector`], and on
//! completion either hands off to the catalog (publish and close) or, with
//! auto-run paused, records the course and leaves the page open.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use autolearn_config::{MarkerConfig, MonitorConfig};
use autolearn_protocols::{CompletionEvent, CourseId, DetailPage, Notice, Notifier};
use autolearn_runloop::{Timer, TimerControl};
use autolearn_store::SignalChannel;

use crate::detection::{Assessment, Layout};
use crate::detector::{Completion, CompletionDetector, DetectorStep};

/// What one polling tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Pending(Assessment),
    /// The page could not be read; counts as not yet complete.
    Unreadable,
    Finished(FinishOutcome),
    /// The detector already reached a terminal state.
    Idle,
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Finished(_) | TickOutcome::Idle)
    }
}

/// How a finished course was handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Signal published; `closed` is false if the host refused to close.
    Published { event: CompletionEvent, closed: bool },
    /// Auto-run was paused: ids recorded, nothing published, page left open.
    HeldOpen {
        course_id: Option<CourseId>,
        requires_review: bool,
    },
}

struct MonitorInner {
    detector: CompletionDetector,
    auto_run_at_start: bool,
    last_reported: Option<usize>,
}

pub struct DetailMonitor<P> {
    page: Arc<P>,
    channel: SignalChannel,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    markers: MarkerConfig,
    inner: Mutex<MonitorInner>,
}

impl<P: DetailPage + 'static> DetailMonitor<P> {
    pub fn new(
        page: Arc<P>,
        channel: SignalChannel,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
        markers: MarkerConfig,
    ) -> Self {
        let detector = CompletionDetector::from_config(&config, &markers);
        Self {
            page,
            channel,
            notifier,
            config,
            markers,
            inner: Mutex::new(MonitorInner {
                detector,
                auto_run_at_start: false,
                last_reported: None,
            }),
        }
    }

    fn course_id(&self) -> Option<CourseId> {
        CourseId::from_location(&self.page.location())
    }

    /// Arm the watchdog and sample the auto-run flag for progress reporting.
    pub fn start(&self) {
        let auto_run = self.channel.state().auto_run();
        {
            let mut inner = self.inner.lock();
            inner.detector = CompletionDetector::from_config(&self.config, &self.markers);
            inner.auto_run_at_start = auto_run;
            inner.last_reported = None;
        }

        info!(
            "Watching course {} (auto-run: {})",
            label(&self.course_id()),
            auto_run
        );
        if !auto_run {
            self.notifier.notify(Notice::transient(
                "Auto-run is paused. This page will not close when the course completes.",
                self.config.notice(),
            ));
        }
    }

    /// Run one polling step.
    pub async fn tick(&self) -> TickOutcome {
        let forced = {
            let mut inner = self.inner.lock();
            if inner.detector.state().is_terminal() {
                return TickOutcome::Idle;
            }
            inner.detector.check_watchdog()
        };
        if let Some(completion) = forced {
            return TickOutcome::Finished(self.finish(completion).await);
        }

        let snapshot = match self.page.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Could not read course page: {}", e);
                return TickOutcome::Unreadable;
            }
        };

        let step = {
            let mut inner = self.inner.lock();
            let step = inner.detector.observe(&snapshot);
            if let DetectorStep::Pending(assessment) = &step {
                self.report_progress(&mut inner, assessment);
            }
            step
        };

        match step {
            DetectorStep::Pending(assessment) => TickOutcome::Pending(assessment),
            DetectorStep::Finished(completion) => {
                TickOutcome::Finished(self.finish(completion).await)
            }
            DetectorStep::Idle => TickOutcome::Idle,
        }
    }

    fn report_progress(&self, inner: &mut MonitorInner, assessment: &Assessment) {
        if !inner.auto_run_at_start
            || assessment.layout != Layout::MultiUnit
            || inner.last_reported == Some(assessment.completed)
        {
            return;
        }
        inner.last_reported = Some(assessment.completed);

        let suffix = if assessment.requires_review {
            " (includes exam)"
        } else {
            ""
        };
        let message = format!(
            "Auto-run in progress: {}/{} units{}",
            assessment.completed, assessment.total, suffix
        );
        debug!("{}", message);
        self.notifier.notify(Notice::persistent(message));
    }

    async fn finish(&self, completion: Completion) -> FinishOutcome {
        let course_id = self.course_id();
        let state = self.channel.state();

        if !completion.forced && !state.auto_run() {
            info!(
                "Course {} complete but auto-run is paused",
                label(&course_id)
            );
            self.notifier.notify(Notice::transient(
                "Course complete, but auto-run is paused. Close this page manually or switch auto-run on.",
                self.config.paused_notice(),
            ));
            if let Some(id) = &course_id {
                if completion.requires_review {
                    state.add_review(id);
                }
                state.add_handled(id);
            }
            return FinishOutcome::HeldOpen {
                course_id,
                requires_review: completion.requires_review,
            };
        }

        let message = if completion.forced {
            warn!(
                "Course {} timed out, publishing regardless of auto-run",
                label(&course_id)
            );
            "Page timed out, moving on to the next course..."
        } else {
            "Course complete, closing this page..."
        };
        self.notifier
            .notify(Notice::transient(message, self.config.notice()));

        let event = self
            .channel
            .publish(completion.requires_review, course_id.clone());
        info!(
            "Course {} finished (review: {}, timeout: {})",
            label(&course_id),
            completion.requires_review,
            completion.forced
        );

        tokio::time::sleep(self.config.close_delay()).await;
        let closed = match self.page.close().await {
            Ok(()) => true,
            Err(e) => {
                if e.is_close_denied() {
                    warn!("Browser refused to close the course page: {}", e);
                } else {
                    warn!("Failed to close the course page: {}", e);
                }
                self.notifier.notify(Notice::persistent(
                    "Could not close this page automatically. Please close it manually.",
                ));
                false
            }
        };

        FinishOutcome::Published { event, closed }
    }

    /// Start polling on a repeating timer that stops once the course finishes.
    pub fn run(self: Arc<Self>) -> Arc<Timer> {
        self.start();
        let interval = self.config.check_interval();
        Timer::repeating("detail-monitor", interval, move || {
            let monitor = self.clone();
            async move {
                if monitor.tick().await.is_terminal() {
                    TimerControl::Stop
                } else {
                    TimerControl::Continue
                }
            }
        })
    }
}

fn label(course_id: &Option<CourseId>) -> &str {
    course_id.as_ref().map(CourseId::short).unwrap_or("unknown")
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
