//! Host page protocol definitions.
//!
//! A host (browser extension, CDP driver, test fake) implements these traits;
//! the monitor and orchestrator only talk to the page through them.

use async_trait::async_trait;

use crate::error::PageError;
use crate::snapshot::{CatalogSnapshot, DetailSnapshot};
use crate::types::{CourseId, ItemMark};

/// A course detail page.
#[async_trait]
pub trait DetailPage: Send + Sync {
    /// Current page location (absolute URL).
    fn location(&self) -> String;

    /// Read the page's completion markers.
    async fn snapshot(&self) -> Result<DetailSnapshot, PageError>;

    /// Close the tab. Browsers may refuse with [`PageError::CloseDenied`].
    async fn close(&self) -> Result<(), PageError>;
}

/// The course catalog page.
#[async_trait]
pub trait CatalogPage: Send + Sync {
    /// Read every catalog item in DOM order.
    async fn snapshot(&self) -> Result<CatalogSnapshot, PageError>;

    /// Set or clear the mark shown on an item.
    async fn apply_mark(&self, id: &CourseId, mark: Option<ItemMark>) -> Result<(), PageError>;

    /// Scroll an item into the center of the viewport.
    async fn scroll_into_view(&self, id: &CourseId) -> Result<(), PageError>;

    /// Activate an item the way a user click would.
    async fn open(&self, id: &CourseId) -> Result<(), PageError>;

    /// Reload the catalog page.
    async fn reload(&self) -> Result<(), PageError>;
}
