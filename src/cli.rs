//! CLI definitions for autolearn.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// autolearn CLI.
#[derive(Parser)]
#[command(name = "autolearn")]
#[command(about = "Inspect and drive the course auto-advance state")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.autolearn/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Shared state file (overrides storage.path)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show handled/review sets, auto-run flag and the signal slot
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every stored entry
    Reset,

    /// Switch auto-run on or off
    AutoRun {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Publish a completion signal as a finished course page would
    Publish {
        /// Finished course id
        #[arg(long)]
        course: Option<String>,

        /// Completion came from an exam score
        #[arg(long)]
        review: bool,
    },

    /// Assess a detail-page snapshot (JSON)
    Detect {
        snapshot: PathBuf,
    },

    /// Tell whether a page summary (JSON) is a catalog or a course page
    Classify {
        summary: PathBuf,
    },

    /// Plan marks and pick the next course from a catalog snapshot (JSON)
    Next {
        snapshot: PathBuf,
    },

    /// Validate the configuration file
    ConfigCheck,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}
