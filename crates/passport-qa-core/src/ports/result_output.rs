//! Result output port for compliance reports.

use crate::domain::ComplianceReport;

/// Port for emitting compliance reports.
pub trait ResultOutput: Send + Sync {
    /// Writes one report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &ComplianceReport) -> anyhow::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
