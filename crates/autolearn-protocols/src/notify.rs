//! Status banner protocol.

use tracing::info;

use crate::types::Notice;

/// Displays status notices to the user.
///
/// A new notice replaces whatever is currently shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_persistent() {
            info!("[NOTICE] {}", notice.message);
        } else {
            info!(
                "[NOTICE] {} ({} ms)",
                notice.message,
                notice.display.as_millis()
            );
        }
    }
}
