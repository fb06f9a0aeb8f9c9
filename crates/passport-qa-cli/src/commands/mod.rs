//! CLI command definitions and handlers.

pub mod check;
pub mod export;
pub mod standards;

use clap::{Parser, Subcommand};

/// Passport QA - identity photo compliance checks and print layouts
#[derive(Parser)]
#[command(name = "passport-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, standard, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check photos against a national standard
    Check(check::CheckArgs),
    /// Crop, render and lay out a photo for printing
    Export(export::ExportArgs),
    /// List supported standards
    Standards(standards::StandardsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Everything checked out.
    Success,
    /// At least one photo is not compliant.
    NonCompliant,
    /// The command could not run.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::NonCompliant => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
