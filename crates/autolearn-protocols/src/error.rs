//! Host page errors.

use thiserror::Error;

/// Errors raised by a host page collaborator.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page could not be read into a snapshot.
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// The browser refused to close the tab programmatically.
    #[error("Close denied: {0}")]
    CloseDenied(String),

    /// A catalog item with the given resource id is not on the page.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Clicking or reloading failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),
}

impl PageError {
    /// Whether this error only degrades the close step.
    pub fn is_close_denied(&self) -> bool {
        matches!(self, PageError::CloseDenied(_))
    }
}
