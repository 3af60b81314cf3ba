//! Structured page snapshots.
//!
//! Hosts extract these small records from the live DOM so the detection and
//! selection heuristics can run as pure functions.

use serde::{Deserialize, Serialize};

use crate::types::{CourseId, ItemMark};

/// Completion markers extracted from a course detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSnapshot {
    /// Page-wide status label texts, used when the page has no mandatory units.
    #[serde(default)]
    pub status_labels: Vec<String>,

    /// One entry per mandatory unit container, in page order.
    #[serde(default)]
    pub units: Vec<UnitSnapshot>,
}

impl DetailSnapshot {
    /// Snapshot of a page with a single requirement.
    pub fn single_unit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status_labels: labels.into_iter().map(Into::into).collect(),
            units: Vec::new(),
        }
    }

    /// Snapshot of a page with several mandatory units.
    pub fn multi_unit(units: Vec<UnitSnapshot>) -> Self {
        Self {
            status_labels: Vec::new(),
            units,
        }
    }
}

/// One mandatory unit of a multi-unit course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    #[serde(default)]
    pub status_labels: Vec<String>,

    /// Texts of the unit's progress indicators, e.g. `"87%"`.
    #[serde(default)]
    pub progress_labels: Vec<String>,
}

impl UnitSnapshot {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status_labels: vec![status.into()],
            progress_labels: Vec::new(),
        }
    }

    pub fn with_progress(progress: impl Into<String>) -> Self {
        Self {
            status_labels: Vec::new(),
            progress_labels: vec![progress.into()],
        }
    }
}

/// The catalog page's course items in DOM order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

/// A catalog item carrying a resource identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub resource_id: CourseId,

    /// Visible text of the whole item.
    #[serde(default)]
    pub text: String,

    /// Text of the item's operation button, if any.
    #[serde(default)]
    pub action_label: Option<String>,

    /// Mark currently applied to the item on the page.
    #[serde(default)]
    pub applied_mark: Option<ItemMark>,
}

impl CatalogItem {
    pub fn new(resource_id: impl Into<CourseId>, text: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            text: text.into(),
            action_label: None,
            applied_mark: None,
        }
    }

    pub fn with_action_label(mut self, label: impl Into<String>) -> Self {
        self.action_label = Some(label.into());
        self
    }

    pub fn with_applied_mark(mut self, mark: ItemMark) -> Self {
        self.applied_mark = Some(mark);
        self
    }
}

/// Structural facts used to decide which role a page plays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub location: String,
    #[serde(default)]
    pub has_catalog_items: bool,
    #[serde(default)]
    pub has_chapter_box: bool,
    #[serde(default)]
    pub has_course_cover: bool,
}

/// Role of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Catalog,
    Detail,
    Unknown,
}

impl PageKind {
    /// Classify a page.
    ///
    /// A page with catalog items and no chapter box is the catalog, even if
    /// its location also looks like a learning page.
    pub fn classify(summary: &PageSummary, learning_path_marker: &str) -> Self {
        let is_catalog = summary.has_catalog_items && !summary.has_chapter_box;
        let is_detail = summary.has_chapter_box
            || summary.has_course_cover
            || (!learning_path_marker.is_empty()
                && summary.location.contains(learning_path_marker));

        if is_catalog {
            PageKind::Catalog
        } else if is_detail {
            PageKind::Detail
        } else {
            PageKind::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(location: &str, items: bool, chapter: bool, cover: bool) -> PageSummary {
        PageSummary {
            location: location.to_string(),
            has_catalog_items: items,
            has_chapter_box: chapter,
            has_course_cover: cover,
        }
    }

    #[test]
    fn test_classify_catalog() {
        let s = summary("https://host/courses", true, false, false);
        assert_eq!(PageKind::classify(&s, "/learning/"), PageKind::Catalog);
    }

    #[test]
    fn test_classify_detail_by_chapter_box() {
        let s = summary("https://host/x", true, true, false);
        assert_eq!(PageKind::classify(&s, "/learning/"), PageKind::Detail);
    }

    #[test]
    fn test_classify_detail_by_location() {
        let s = summary("https://host/learning/42", false, false, false);
        assert_eq!(PageKind::classify(&s, "/learning/"), PageKind::Detail);
    }

    #[test]
    fn test_classify_catalog_wins_over_location() {
        let s = summary("https://host/learning/list", true, false, false);
        assert_eq!(PageKind::classify(&s, "/learning/"), PageKind::Catalog);
    }

    #[test]
    fn test_classify_unknown() {
        let s = summary("https://host/home", false, false, false);
        assert_eq!(PageKind::classify(&s, "/learning/"), PageKind::Unknown);
        assert_eq!(PageKind::classify(&s, ""), PageKind::Unknown);
    }

    #[test]
    fn test_catalog_snapshot_deserializes_sparse_items() {
        let json = r#"{"items":[{"resource_id":"a"},{"resource_id":"b","text":"参与考试","applied_mark":"handled"}]}"#;
        let snapshot: CatalogSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].resource_id.as_str(), "a");
        assert!(snapshot.items[0].action_label.is_none());
        assert_eq!(snapshot.items[1].applied_mark, Some(ItemMark::Handled));
    }
}
