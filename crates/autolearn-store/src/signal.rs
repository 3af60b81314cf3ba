//! Cross-tab signal channel.
//!
//! The mailbox holds at most one [`CompletionEvent`]. Publishing overwrites
//! it; consuming clears it. Consumers keep their own watermark in memory, so
//! an event that was already accepted is never accepted again even after the
//! slot is nulled out or re-read.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, warn};

use autolearn_protocols::{Clock, CompletionEvent, CourseId, SignalAction};

use crate::keys::StorageKey;
use crate::state::StateStore;

const CLEARED_SLOT: &str = "null";

/// Publisher and consumer side of the single-slot mailbox.
#[derive(Clone)]
pub struct SignalChannel {
    state: StateStore,
    clock: Arc<dyn Clock>,
}

impl SignalChannel {
    pub fn new(state: StateStore, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Overwrite the mailbox with a freshly stamped `NEXT` event.
    pub fn publish(&self, requires_review: bool, course_id: Option<CourseId>) -> CompletionEvent {
        let event = CompletionEvent::next(self.clock.now_millis(), requires_review, course_id);
        let key = self.state.keys().key(StorageKey::Signal);

        match serde_json::to_string(&event) {
            Ok(encoded) => match self.state.kv().set(&key, &encoded) {
                Ok(()) => debug!("Published completion signal at {}", event.timestamp),
                Err(e) => warn!("Failed to publish completion signal: {}", e),
            },
            Err(e) => warn!("Failed to serialize completion signal: {}", e),
        }

        event
    }

    /// Take the event if it is newer than `last_seen`.
    ///
    /// Read, compare and clear happen in one call with no suspension point.
    /// The clear is a compare-and-swap against the value just read, so a
    /// concurrent consumer or a fresh publish in between makes this call
    /// return `None` instead of double-delivering or dropping an event.
    pub fn consume_if_newer(&self, last_seen: i64) -> Option<CompletionEvent> {
        let raw = self.state.read_raw(StorageKey::Signal)?;
        let event: CompletionEvent = self.state.parse_raw(StorageKey::Signal, &raw)?;

        if event.action != SignalAction::Next || event.timestamp <= last_seen {
            return None;
        }

        let key = self.state.keys().key(StorageKey::Signal);
        match self.state.kv().compare_and_swap(&key, Some(&raw), CLEARED_SLOT) {
            Ok(true) => Some(event),
            Ok(false) => {
                debug!("Signal slot changed while consuming, retrying on next poll");
                None
            }
            Err(e) => {
                warn!("Failed to clear signal slot: {}", e);
                None
            }
        }
    }
}

/// Consumer that tracks its own watermark.
pub struct SignalReceiver {
    channel: SignalChannel,
    watermark: AtomicI64,
}

impl SignalReceiver {
    /// Receiver that ignores anything published before now.
    pub fn new(channel: SignalChannel) -> Self {
        let watermark = channel.clock().now_millis();
        Self::with_watermark(channel, watermark)
    }

    pub fn with_watermark(channel: SignalChannel, watermark: i64) -> Self {
        Self {
            channel,
            watermark: AtomicI64::new(watermark),
        }
    }

    pub fn watermark(&self) -> i64 {
        self.watermark.load(Ordering::SeqCst)
    }

    /// Accept the pending event if it is newer than the watermark.
    pub fn poll(&self) -> Option<CompletionEvent> {
        let event = self.channel.consume_if_newer(self.watermark())?;
        self.watermark.fetch_max(event.timestamp, Ordering::SeqCst);
        Some(event)
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
