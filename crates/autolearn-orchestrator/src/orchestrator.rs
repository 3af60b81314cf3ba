//! Catalog orchestrator.
//!
//! Three timers run for the lifetime of the catalog page: the marking pass,
//! the signal poll, and a one-off startup announce. Advances triggered by a
//! signal are scheduled as one-shot timers in the same group.

use std::sync::Arc;

use tracing::{debug, info, warn};

use autolearn_config::{MarkerConfig, OrchestratorConfig};
use autolearn_protocols::{CatalogPage, CompletionEvent, CourseId, Notice, Notifier, PageError};
use autolearn_runloop::{Timer, TimerControl, TimerGroup};
use autolearn_store::{SignalChannel, SignalReceiver, StateStore};

use crate::marking::{MarkPlan, plan_marks};
use crate::selection::select_next;

/// Result of one signal poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Nothing new in the mailbox.
    Idle,
    /// Event recorded; an advance is scheduled.
    Scheduled(CompletionEvent),
    /// Event recorded; auto-run is off so nothing else happens.
    Paused(CompletionEvent),
}

/// Result of [`CatalogOrchestrator::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Paused,
    Opened(CourseId),
    /// Nothing eligible on this page. Pagination is left to the user.
    Exhausted,
    Unreadable,
    OpenFailed(CourseId),
}

pub struct CatalogOrchestrator<P> {
    page: Arc<P>,
    state: StateStore,
    receiver: SignalReceiver,
    notifier: Arc<dyn Notifier>,
    config: OrchestratorConfig,
    markers: MarkerConfig,
    timers: TimerGroup,
}

impl<P: CatalogPage + 'static> CatalogOrchestrator<P> {
    /// Create the orchestrator for a freshly loaded catalog page.
    ///
    /// Signals published before this call are never delivered.
    pub fn new(
        page: Arc<P>,
        channel: SignalChannel,
        notifier: Arc<dyn Notifier>,
        config: OrchestratorConfig,
        markers: MarkerConfig,
    ) -> Arc<Self> {
        let state = channel.state().clone();
        Arc::new(Self {
            page,
            state,
            receiver: SignalReceiver::new(channel),
            notifier,
            config,
            markers,
            timers: TimerGroup::new(),
        })
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn timers(&self) -> &TimerGroup {
        &self.timers
    }

    /// Load-time reset of the session entries: auto-run off, no last-opened id.
    pub fn start(&self) {
        self.state.set_auto_run(false);
        self.state.set_last_opened(None);
        info!(
            "Catalog orchestrator started (signal watermark {})",
            self.receiver.watermark()
        );
    }

    /// Sync catalog marks with the stored sets.
    ///
    /// Only ids that are new to the handled set cause a storage write.
    pub async fn mark_pass(&self) -> MarkPlan {
        let snapshot = match self.page.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("Could not read catalog: {}", e);
                return MarkPlan::default();
            }
        };

        let plan = plan_marks(
            &snapshot,
            &self.state.handled(),
            &self.state.review(),
            &self.markers,
        );
        if !plan.newly_handled.is_empty() {
            let added = self.state.add_handled_all(&plan.newly_handled);
            debug!("Recorded {} course(s) finished outside auto-run", added);
        }
        for (id, mark) in &plan.updates {
            if let Err(e) = self.page.apply_mark(id, *mark).await {
                warn!("Failed to mark course {}: {}", id.short(), e);
            }
        }
        plan
    }

    /// Take a pending completion signal, if any.
    ///
    /// The mailbox is read and cleared without suspending.
    pub fn poll_signal(self: &Arc<Self>) -> SignalOutcome {
        let Some(event) = self.receiver.poll() else {
            return SignalOutcome::Idle;
        };

        info!(
            "Completion signal received (course {}, review: {})",
            event
                .course_id
                .as_ref()
                .map(CourseId::short)
                .unwrap_or("unknown"),
            event.requires_review
        );
        if let Some(id) = &event.course_id {
            if event.requires_review {
                self.state.add_review(id);
            }
            self.state.add_handled(id);
        }

        if !self.state.auto_run() {
            self.notifier
                .notify(Notice::persistent("A course finished. Auto-run is paused."));
            return SignalOutcome::Paused(event);
        }

        let delay = self.config.next_delay();
        self.notifier.notify(Notice::transient(
            format!(
                "Previous course finished, continuing in {} s...",
                delay.as_secs()
            ),
            self.config.notice(),
        ));
        let this = Arc::downgrade(self);
        self.timers.add(Timer::once("advance", delay, move || {
            let this = this.clone();
            async move {
                if let Some(orchestrator) = this.upgrade() {
                    orchestrator.advance().await;
                }
            }
        }));
        SignalOutcome::Scheduled(event)
    }

    /// Open the next eligible course.
    pub async fn advance(&self) -> AdvanceOutcome {
        if !self.state.auto_run() {
            debug!("Auto-run is off, not advancing");
            self.notifier.notify(Notice::persistent("Auto-run is paused."));
            return AdvanceOutcome::Paused;
        }

        let snapshot = match self.page.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Could not read catalog for advance: {}", e);
                return AdvanceOutcome::Unreadable;
            }
        };

        let last_opened = self.state.last_opened();
        let Some(item) = select_next(
            &snapshot,
            &self.state.handled(),
            &self.state.review(),
            last_opened.as_ref(),
            &self.markers,
        ) else {
            info!("No eligible course left on this page");
            self.notifier.notify(Notice::persistent(
                "Everything on this page seems to be done.",
            ));
            return AdvanceOutcome::Exhausted;
        };
        let id = item.resource_id.clone();

        info!("Opening course {}", id);
        self.state.set_last_opened(Some(&id));
        self.notifier.notify(Notice::persistent("Opening course..."));

        if let Err(e) = self.page.scroll_into_view(&id).await {
            debug!("Could not scroll to course {}: {}", id.short(), e);
        }
        tokio::time::sleep(self.config.scroll_settle()).await;

        match self.page.open(&id).await {
            Ok(()) => AdvanceOutcome::Opened(id),
            Err(e) => {
                warn!("Failed to open course {}: {}", id.short(), e);
                self.notifier.notify(Notice::persistent(format!(
                    "Could not open course {}. Open it manually.",
                    id.short()
                )));
                AdvanceOutcome::OpenFailed(id)
            }
        }
    }

    /// Persist the auto-run flag. Turning it on advances immediately.
    pub async fn set_auto_run(&self, enabled: bool) -> Option<AdvanceOutcome> {
        self.state.set_auto_run(enabled);
        info!("Auto-run switched {}", if enabled { "on" } else { "off" });

        if !enabled {
            self.notifier.notify(Notice::persistent("Auto-run paused."));
            return None;
        }

        self.state.set_last_opened(None);
        self.notifier
            .notify(Notice::transient("Auto-run started.", self.config.notice()));
        Some(self.advance().await)
    }

    /// Report the auto-run state; advance if it is already on.
    pub async fn announce(&self) -> Option<AdvanceOutcome> {
        if self.state.auto_run() {
            self.notifier.notify(Notice::persistent("Auto-run is on."));
            Some(self.advance().await)
        } else {
            self.notifier.notify(Notice::persistent(
                "Auto-run is paused. Switch it on to start.",
            ));
            None
        }
    }

    /// Delete every shared entry and reload the catalog.
    pub async fn reset(&self) -> Result<(), PageError> {
        warn!("Resetting all stored course state");
        self.timers.cancel_all();
        self.state.reset();
        self.page.reload().await
    }

    /// Start the catalog timers.
    pub async fn run(self: &Arc<Self>) {
        self.start();
        self.mark_pass().await;

        let this = Arc::downgrade(self);
        self.timers.add(Timer::repeating(
            "mark-pass",
            self.config.mark_interval(),
            move || {
                let this = this.clone();
                async move {
                    match this.upgrade() {
                        Some(orchestrator) => {
                            orchestrator.mark_pass().await;
                            TimerControl::Continue
                        }
                        None => TimerControl::Stop,
                    }
                }
            },
        ));

        let this = Arc::downgrade(self);
        self.timers.add(Timer::repeating(
            "signal-poll",
            self.config.signal_interval(),
            move || {
                let this = this.clone();
                async move {
                    match this.upgrade() {
                        Some(orchestrator) => {
                            orchestrator.poll_signal();
                            TimerControl::Continue
                        }
                        None => TimerControl::Stop,
                    }
                }
            },
        ));

        let this = Arc::downgrade(self);
        self.timers.add(Timer::once(
            "announce",
            self.config.announce_delay(),
            move || {
                let this = this.clone();
                async move {
                    if let Some(orchestrator) = this.upgrade() {
                        orchestrator.announce().await;
                    }
                }
            },
        ));
    }

    /// Cancel every catalog timer.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
        debug!("Catalog timers cancelled");
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
