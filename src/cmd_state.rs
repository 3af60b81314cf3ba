//! State subcommand handlers.

use std::sync::Arc;

use chrono::DateTime;
use tracing::info;

use autolearn_protocols::{CompletionEvent, CourseId, SystemClock};
use autolearn_store::{CourseSet, SignalChannel, StateStore};

/// Print the shared state.
pub(crate) fn status(state: &StateStore, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = state.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{:<14} {}", "Auto-run:", if summary.auto_run { "on" } else { "off" });
    println!(
        "{:<14} {}",
        "Last opened:",
        summary.last_opened.as_ref().map(CourseId::as_str).unwrap_or("-")
    );
    println!("{:<14} {}", "Handled:", render_set(&summary.handled));
    println!("{:<14} {}", "Needs review:", render_set(&summary.review));
    println!(
        "{:<14} {}",
        "Signal:",
        summary
            .pending_signal
            .as_ref()
            .map(render_signal)
            .unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}

/// Delete every stored entry.
pub(crate) fn reset(state: &StateStore) -> Result<(), Box<dyn std::error::Error>> {
    state.reset();
    info!("Stored state under prefix '{}' cleared", state.keys().prefix());
    println!("State cleared.");
    Ok(())
}

pub(crate) fn auto_run(state: &StateStore, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    state.set_auto_run(enabled);
    if enabled {
        state.set_last_opened(None);
    }
    println!("Auto-run {}.", if enabled { "on" } else { "off" });
    Ok(())
}

/// Publish a completion signal.
pub(crate) fn publish(
    state: &StateStore,
    course: Option<String>,
    review: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let channel = SignalChannel::new(state.clone(), Arc::new(SystemClock));
    let event = channel.publish(review, course.map(CourseId::new));
    println!("Published {}", render_signal(&event));
    Ok(())
}

fn render_set(set: &CourseSet) -> String {
    if set.is_empty() {
        return "-".to_string();
    }
    let ids: Vec<&str> = set.iter().map(CourseId::short).collect();
    format!("{} ({})", set.len(), ids.join(", "))
}

fn render_signal(event: &CompletionEvent) -> String {
    let time = DateTime::from_timestamp_millis(event.timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| event.timestamp.to_string());
    let course = event
        .course_id
        .as_ref()
        .map(CourseId::as_str)
        .unwrap_or("unknown");
    let review = if event.requires_review { ", needs review" } else { "" };
    format!("NEXT at {} (course {}{})", time, course, review)
}
