//! Next-item selection.

use tracing::debug;

use autolearn_config::MarkerConfig;
use autolearn_protocols::{CatalogItem, CatalogSnapshot, CourseId};
use autolearn_store::CourseSet;

use crate::marking::resolve_mark;

/// First catalog item, in page order, that may be opened automatically.
///
/// Skips the item opened last (its mark may not be visible yet), anything
/// marked or resolving to a mark, and exam entries.
pub fn select_next<'a>(
    snapshot: &'a CatalogSnapshot,
    handled: &CourseSet,
    review: &CourseSet,
    last_opened: Option<&CourseId>,
    markers: &MarkerConfig,
) -> Option<&'a CatalogItem> {
    snapshot.items.iter().find(|item| {
        let id = &item.resource_id;
        if id.as_str().is_empty() {
            return false;
        }
        if last_opened == Some(id) {
            debug!("Skipping {} (opened last)", id.short());
            return false;
        }
        if item.applied_mark.is_some() || resolve_mark(item, handled, review, markers).is_some() {
            return false;
        }
        if markers.is_exam_text(&item.text) {
            debug!("Skipping {} (exam entry)", id.short());
            return false;
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolearn_protocols::ItemMark;

    fn set(ids: &[&str]) -> CourseSet {
        ids.iter().map(|id| CourseId::new(*id)).collect()
    }

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot {
            items: vec![
                CatalogItem::new("A", "Course A"),
                CatalogItem::new("B", "Course B"),
                CatalogItem::new("C", "Final test 参与考试"),
                CatalogItem::new("D", "Course D"),
            ],
        }
    }

    #[test]
    fn test_skips_handled_review_and_exam() {
        let snapshot = catalog();
        let next = select_next(
            &snapshot,
            &set(&["A"]),
            &set(&["B"]),
            None,
            &MarkerConfig::default(),
        );
        assert_eq!(next.map(|i| i.resource_id.as_str()), Some("D"));
    }

    #[test]
    fn test_skips_last_opened() {
        let snapshot = catalog();
        let last = CourseId::new("A");
        let next = select_next(
            &snapshot,
            &CourseSet::new(),
            &CourseSet::new(),
            Some(&last),
            &MarkerConfig::default(),
        );
        assert_eq!(next.map(|i| i.resource_id.as_str()), Some("B"));
    }

    #[test]
    fn test_skips_applied_marks_and_exam_records() {
        let snapshot = CatalogSnapshot {
            items: vec![
                CatalogItem::new("A", "A").with_applied_mark(ItemMark::Handled),
                CatalogItem::new("B", "B 考试记录"),
                CatalogItem::new("C", "C").with_action_label("重新学习"),
            ],
        };
        let next = select_next(
            &snapshot,
            &CourseSet::new(),
            &CourseSet::new(),
            None,
            &MarkerConfig::default(),
        );
        assert!(next.is_none());
    }
}
