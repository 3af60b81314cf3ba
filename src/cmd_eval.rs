//! Offline evaluation of page snapshots and configuration.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use autolearn_config::{Config, ConfigValidator};
use autolearn_monitor::assess;
use autolearn_orchestrator::{plan_marks, select_next};
use autolearn_protocols::{
    CatalogSnapshot, CourseId, DetailSnapshot, ItemMark, PageKind, PageSummary,
};
use autolearn_store::StateStore;

async fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Assess a detail-page snapshot.
pub(crate) async fn detect(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot: DetailSnapshot = read_snapshot(path).await?;
    let assessment = assess(
        &snapshot,
        &config.markers,
        config.monitor.completion_threshold,
    );

    let report = json!({
        "assessment": assessment,
        "complete": assessment.is_complete(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Classify a page from its structural summary.
pub(crate) async fn classify(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let summary: PageSummary = read_snapshot(path).await?;
    let kind = PageKind::classify(&summary, &config.markers.learning_path);

    let report = json!({
        "location": summary.location,
        "kind": kind,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Mark updates as the catalog page would render them. A `null` mark clears
/// the badge.
fn render_marks(updates: &[(CourseId, Option<ItemMark>)]) -> Vec<Value> {
    updates
        .iter()
        .map(|(id, mark)| {
            json!({
                "id": id,
                "mark": mark.map(|m| m.to_string()),
                "class": mark.map(|m| m.css_class()),
                "badge": mark.map(|m| m.badge()),
            })
        })
        .collect()
}

/// Dry-run a marking pass and the next-course pick against the stored state.
pub(crate) async fn next(
    state: &StateStore,
    path: &Path,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot: CatalogSnapshot = read_snapshot(path).await?;
    let handled = state.handled();
    let review = state.review();
    let last_opened = state.last_opened();

    let plan = plan_marks(&snapshot, &handled, &review, &config.markers);
    let next = select_next(
        &snapshot,
        &handled,
        &review,
        last_opened.as_ref(),
        &config.markers,
    );

    let report = json!({
        "marks": render_marks(&plan.updates),
        "newly_handled": plan.newly_handled,
        "next": next.map(|item| &item.resource_id),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Validate the configuration and print problems.
pub(crate) fn config_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    result.into_result()?;
    println!("Configuration OK.");
    Ok(())
}
