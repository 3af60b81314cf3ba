//! Polling and delay configuration for the monitor and the orchestrator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Detail-page monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Completion polling interval.
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,

    /// Watchdog ceiling; exceeding it forces completion.
    #[serde(default = "default_max_wait")]
    pub max_wait_minutes: u64,

    /// Delay between publishing and the close attempt.
    #[serde(default = "default_close_delay")]
    pub close_delay_ms: u64,

    /// Percentage at or above which a unit counts as complete.
    #[serde(default = "default_threshold")]
    pub completion_threshold: f64,

    #[serde(default = "default_monitor_notice")]
    pub notice_ms: u64,

    /// How long the "completed but paused" notice stays up.
    #[serde(default = "default_paused_notice")]
    pub paused_notice_ms: u64,
}

fn default_check_interval() -> u64 {
    2000
}

fn default_max_wait() -> u64 {
    120
}

fn default_close_delay() -> u64 {
    1000
}

fn default_threshold() -> f64 {
    95.0
}

fn default_monitor_notice() -> u64 {
    5000
}

fn default_paused_notice() -> u64 {
    10_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval(),
            max_wait_minutes: default_max_wait(),
            close_delay_ms: default_close_delay(),
            completion_threshold: default_threshold(),
            notice_ms: default_monitor_notice(),
            paused_notice_ms: default_paused_notice(),
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_minutes * 60)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn notice(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn paused_notice(&self) -> Duration {
        Duration::from_millis(self.paused_notice_ms)
    }
}

/// Catalog orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Catalog re-mark interval.
    #[serde(default = "default_mark_interval")]
    pub mark_interval_ms: u64,

    /// Signal mailbox polling interval.
    #[serde(default = "default_signal_interval")]
    pub signal_interval_ms: u64,

    /// Delay between a delivered completion and the next advance.
    #[serde(default = "default_next_delay")]
    pub next_delay_ms: u64,

    /// Delay between scrolling an item into view and opening it.
    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Delay before the startup state announcement.
    #[serde(default = "default_announce_delay")]
    pub announce_delay_ms: u64,

    #[serde(default = "default_orchestrator_notice")]
    pub notice_ms: u64,
}

fn default_mark_interval() -> u64 {
    2000
}

fn default_signal_interval() -> u64 {
    1000
}

fn default_next_delay() -> u64 {
    3000
}

fn default_scroll_settle() -> u64 {
    500
}

fn default_announce_delay() -> u64 {
    1500
}

fn default_orchestrator_notice() -> u64 {
    3000
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mark_interval_ms: default_mark_interval(),
            signal_interval_ms: default_signal_interval(),
            next_delay_ms: default_next_delay(),
            scroll_settle_ms: default_scroll_settle(),
            announce_delay_ms: default_announce_delay(),
            notice_ms: default_orchestrator_notice(),
        }
    }
}

impl OrchestratorConfig {
    pub fn mark_interval(&self) -> Duration {
        Duration::from_millis(self.mark_interval_ms)
    }

    pub fn signal_interval(&self) -> Duration {
        Duration::from_millis(self.signal_interval_ms)
    }

    pub fn next_delay(&self) -> Duration {
        Duration::from_millis(self.next_delay_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }

    pub fn notice(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}
