//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_storage;
mod schema_timing;

pub use schema_storage::*;
pub use schema_timing::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Detail-page monitor timing.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Catalog orchestrator timing.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Literal texts the page heuristics match against.
    #[serde(default)]
    pub markers: MarkerConfig,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
