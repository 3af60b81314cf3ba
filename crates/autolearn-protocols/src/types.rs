//! Domain types shared by the monitor, the orchestrator and the store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Course identifier as carried by catalog items and detail-page URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, used in notices and logs.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Extract the course id from a detail page location (`?id=...`).
    ///
    /// Returns `None` when the location is not an absolute URL or carries no
    /// non-empty `id` query parameter.
    pub fn from_location(location: &str) -> Option<Self> {
        let url = url::Url::parse(location).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .map(Self)
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of a cross-tab signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalAction {
    /// A course finished; the catalog may open the next one.
    #[serde(rename = "NEXT")]
    Next,
}

/// Event placed in the single-slot signal mailbox by a detail-page monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub action: SignalAction,

    /// Epoch milliseconds at publish time.
    #[serde(rename = "time")]
    pub timestamp: i64,

    /// Completion came from a score label and needs a human to confirm the result.
    #[serde(rename = "isExam", default)]
    pub requires_review: bool,

    #[serde(rename = "courseId", default)]
    pub course_id: Option<CourseId>,
}

impl CompletionEvent {
    /// Create a `NEXT` event.
    pub fn next(timestamp: i64, requires_review: bool, course_id: Option<CourseId>) -> Self {
        Self {
            action: SignalAction::Next,
            timestamp,
            requires_review,
            course_id,
        }
    }
}

/// Visual and logical mark applied to a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMark {
    /// Finished or skipped; never opened automatically again.
    Handled,
    /// Finished through a scored unit; a human must check the result.
    NeedsReview,
}

impl ItemMark {
    /// CSS class the host page applies for this mark.
    pub fn css_class(&self) -> &'static str {
        match self {
            ItemMark::Handled => "course-clicked-mark",
            ItemMark::NeedsReview => "course-exam-check-mark",
        }
    }

    /// Badge text rendered on the marked item.
    pub fn badge(&self) -> &'static str {
        match self {
            ItemMark::Handled => "已学/跳过",
            ItemMark::NeedsReview => "请检查是否通过考试",
        }
    }
}

impl std::fmt::Display for ItemMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemMark::Handled => write!(f, "handled"),
            ItemMark::NeedsReview => write!(f, "needs-review"),
        }
    }
}

/// A message for the status banner.
///
/// A zero `display` duration keeps the notice up until it is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub display: Duration,
}

impl Notice {
    /// Notice that hides itself after `display`.
    pub fn transient(message: impl Into<String>, display: Duration) -> Self {
        Self {
            message: message.into(),
            display,
        }
    }

    /// Notice that stays until the next one replaces it.
    pub fn persistent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            display: Duration::ZERO,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.display.is_zero()
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
