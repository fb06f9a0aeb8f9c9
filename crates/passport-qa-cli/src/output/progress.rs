//! Progress reporting on stderr using indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use passport_qa_core::{ComplianceReport, ProgressEvent, ProgressSink};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

enum Mode {
    /// Nothing is printed.
    Silent,
    /// A live bar; skips are still printed above it.
    Bar(IndicatifBar),
    /// One line per skipped or non-compliant photo.
    Lines,
}

/// Progress sink for the check command.
pub struct ProgressBar {
    mode: Mode,
}

impl ProgressBar {
    /// Creates the sink. `quiet` wins over `show_bar`.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let mode = match (quiet, show_bar) {
            (true, _) => Mode::Silent,
            (false, true) => {
                let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
                if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                Mode::Bar(bar)
            }
            (false, false) => Mode::Lines,
        };
        Self { mode }
    }

    fn print(&self, line: &str) {
        match &self.mode {
            Mode::Silent => {}
            Mode::Bar(bar) => bar.println(line),
            Mode::Lines => eprintln!("{line}"),
        }
    }
}

fn verdict_line(report: &ComplianceReport) -> String {
    let failures: Vec<_> = report
        .result
        .critical_failures
        .iter()
        .map(|id| id.label())
        .collect();
    format!(
        "{}: not compliant with {} ({})",
        report.path,
        report.standard,
        failures.join(", ")
    )
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Mode::Bar(bar) = &self.mode {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { report } => match &self.mode {
                Mode::Bar(bar) => bar.inc(1),
                Mode::Lines if !report.result.is_compliant => eprintln!("{}", verdict_line(&report)),
                _ => {}
            },
            ProgressEvent::Skipped { path, reason } => {
                if let Mode::Bar(bar) = &self.mode {
                    bar.inc(1);
                }
                self.print(&format!("WARN: Skipping {path}: {reason}"));
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Mode::Bar(bar) = &self.mode {
                    bar.finish_with_message(format!("{processed} checked, {skipped} skipped"));
                }
            }
        }
    }
}
