//! Output formatting for CLI.

mod json;
mod progress;

use clap::ValueEnum;

pub use json::JsonOutput;
pub use progress::ProgressBar;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}
