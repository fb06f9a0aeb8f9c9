//! Progress reporting port.

use crate::domain::ComplianceReport;

/// Events emitted while a batch of photos is checked.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Checking started for a photo.
    Started {
        /// Path to the photo.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Batch size, if known.
        total: Option<usize>,
    },
    /// A photo was checked.
    Completed {
        /// The finished report.
        report: Box<ComplianceReport>,
    },
    /// A photo could not be loaded or observed.
    Skipped {
        /// Path to the photo.
        path: String,
        /// Why it was skipped.
        reason: String,
    },
    /// The batch is done.
    Finished {
        /// Photos checked.
        processed: usize,
        /// Photos skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called for every event.
    fn on_event(&self, event: ProgressEvent);
}
