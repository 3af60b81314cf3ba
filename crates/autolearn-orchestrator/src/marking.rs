//! Catalog mark resolution.
//!
//! Priority: needs-review, then handled (stored, or a visible redo button),
//! then unmarked.

use serde::Serialize;

use autolearn_config::MarkerConfig;
use autolearn_protocols::{CatalogItem, CatalogSnapshot, CourseId, ItemMark};
use autolearn_store::CourseSet;

/// Whether the item shows the "learn again" button of a finished course.
pub fn is_redo_available(item: &CatalogItem, markers: &MarkerConfig) -> bool {
    item.action_label
        .as_deref()
        .is_some_and(|label| !markers.redo.is_empty() && label.trim() == markers.redo)
}

/// The mark an item should carry.
pub fn resolve_mark(
    item: &CatalogItem,
    handled: &CourseSet,
    review: &CourseSet,
    markers: &MarkerConfig,
) -> Option<ItemMark> {
    if review.contains(&item.resource_id) {
        Some(ItemMark::NeedsReview)
    } else if is_redo_available(item, markers) || handled.contains(&item.resource_id) {
        Some(ItemMark::Handled)
    } else {
        None
    }
}

/// Changes one marking pass has to make.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkPlan {
    /// Items whose applied mark differs from the resolved one.
    pub updates: Vec<(CourseId, Option<ItemMark>)>,
    /// Finished-looking items missing from the handled set.
    pub newly_handled: Vec<CourseId>,
}

impl MarkPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.newly_handled.is_empty()
    }
}

/// Plan a marking pass. An unchanged, already-marked snapshot yields an
/// empty plan.
pub fn plan_marks(
    snapshot: &CatalogSnapshot,
    handled: &CourseSet,
    review: &CourseSet,
    markers: &MarkerConfig,
) -> MarkPlan {
    let mut plan = MarkPlan::default();

    for item in &snapshot.items {
        if item.resource_id.as_str().is_empty() {
            continue;
        }

        let mark = resolve_mark(item, handled, review, markers);
        if item.applied_mark != mark {
            plan.updates.push((item.resource_id.clone(), mark));
        }

        if !review.contains(&item.resource_id)
            && is_redo_available(item, markers)
            && !handled.contains(&item.resource_id)
            && !plan.newly_handled.contains(&item.resource_id)
        {
            plan.newly_handled.push(item.resource_id.clone());
        }
    }

    plan
}
