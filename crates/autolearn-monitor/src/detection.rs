//! Completion heuristics over a detail-page snapshot.

use serde::Serialize;

use autolearn_config::MarkerConfig;
use autolearn_protocols::{DetailSnapshot, UnitSnapshot};

/// Which detection path a snapshot took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// No mandatory unit containers; page-wide status labels decide.
    SingleUnit,
    /// Every mandatory unit must be complete.
    MultiUnit,
}

/// Verdict for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub layout: Layout,
    pub completed: usize,
    pub total: usize,
    /// A score label was seen on a counted unit.
    pub requires_review: bool,
}

impl Assessment {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Assess a snapshot.
///
/// A page with unit containers is judged unit by unit; otherwise the
/// page-wide status labels are scanned and the first recognized label wins.
pub fn assess(snapshot: &DetailSnapshot, markers: &MarkerConfig, threshold: f64) -> Assessment {
    if snapshot.units.is_empty() {
        let verdict = status_verdict(&snapshot.status_labels, markers);
        return Assessment {
            layout: Layout::SingleUnit,
            completed: usize::from(verdict.is_some()),
            total: 1,
            requires_review: verdict.unwrap_or(false),
        };
    }

    let mut completed = 0;
    let mut requires_review = false;
    for unit in &snapshot.units {
        if let Some(review) = unit_verdict(unit, markers, threshold) {
            completed += 1;
            requires_review |= review;
        }
    }

    Assessment {
        layout: Layout::MultiUnit,
        completed,
        total: snapshot.units.len(),
        requires_review,
    }
}

/// `Some(requires_review)` when a label marks the unit done.
fn status_verdict(labels: &[String], markers: &MarkerConfig) -> Option<bool> {
    labels.iter().find_map(|label| {
        let label = label.trim();
        if !markers.completed.is_empty() && label == markers.completed {
            Some(false)
        } else if !markers.score.is_empty() && label.contains(&markers.score) {
            Some(true)
        } else {
            None
        }
    })
}

fn unit_verdict(unit: &UnitSnapshot, markers: &MarkerConfig, threshold: f64) -> Option<bool> {
    if let Some(review) = status_verdict(&unit.status_labels, markers) {
        return Some(review);
    }

    // Only the first percentage-shaped label counts.
    let percent = unit.progress_labels.iter().find_map(|l| parse_percentage(l))?;
    (percent >= threshold).then_some(false)
}

/// Parse labels like `"87%"`. Anything but digits followed by `%` is rejected.
pub fn parse_percentage(label: &str) -> Option<f64> {
    let digits = label.trim().strip_suffix('%')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[path = "detection_tests.rs"]
mod tests;
