//! Check command - verify photos against a national standard.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use passport_qa_adapters::{DetectorFormat, FsImageSource, SidecarFaceProvider};
use passport_qa_core::{
    registry, ComplianceChecker, ComplianceConfig, ComplianceReport, FaceGeometryProvider,
    ImageAnalyzer, ImageSource, ProgressEvent, ProgressSink, ResultOutput, StandardCode,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Parse and validate a fraction (0.0-1.0).
pub(crate) fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Arguments of the check command.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Photos or directories to check
    pub paths: Vec<PathBuf>,

    /// Standard to check against (us, uk, eu, ca, in, cn, au, jp)
    #[arg(short, long)]
    pub standard: Option<StandardCode>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Directory holding `<stem>.face.json` detector output
    #[arg(long, value_name = "DIR")]
    pub faces_dir: Option<PathBuf>,

    /// Detector output format (auto-detected when omitted)
    #[arg(long)]
    pub detector: Option<DetectorFormat>,

    /// Minimum sharpness (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub sharpness_min: Option<f64>,

    /// Minimum contrast (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub contrast_min: Option<f64>,

    /// Face confidence below which the detection only warns (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub min_face_confidence: Option<f64>,

    /// Include the measurements in every report
    #[arg(long)]
    pub include_analysis: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.standard.is_none() {
            args.standard = config.standard();
        }
        if args.faces_dir.is_none() {
            args.faces_dir.clone_from(&config.general.faces_dir);
        }
        if args.detector.is_none() {
            args.detector = config
                .general
                .detector
                .as_deref()
                .and_then(|s| s.parse().ok());
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| match s {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.include_analysis {
            args.include_analysis = config.output.analysis.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args.config = Some(config.clone());
        args
    }

    /// Standard with fallback to US.
    fn standard(&self) -> StandardCode {
        self.standard.unwrap_or(StandardCode::Us)
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    /// Rule thresholds: config file, then CLI overrides.
    fn compliance_config(&self) -> ComplianceConfig {
        let mut cfg = self
            .config
            .as_ref()
            .map_or_else(ComplianceConfig::default, AppConfig::compliance_config);
        if let Some(v) = self.sharpness_min {
            cfg.sharpness_min = v;
        }
        if let Some(v) = self.contrast_min {
            cfg.contrast_min = v;
        }
        if let Some(v) = self.min_face_confidence {
            cfg.min_face_confidence = v;
        }
        cfg
    }

    fn analyzer(&self) -> ImageAnalyzer {
        let cfg = self
            .config
            .as_ref()
            .map(AppConfig::analyzer_config)
            .unwrap_or_default();
        ImageAnalyzer::new(cfg)
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of photos checked.
    pub processed: usize,
    /// Number of photos skipped.
    pub skipped: usize,
    /// Number of photos that are not compliant.
    pub non_compliant: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let config = args.compliance_config();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid thresholds: {e}"))?;

    let requirement = registry::get(args.standard());
    debug!(standard = %requirement.code, "checking against {}", requirement.name);

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let mut provider = SidecarFaceProvider::new(args.faces_dir.clone(), args.detector);
    provider
        .init()
        .context("Failed to start the face provider")?;

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);
    let output = JsonOutput::stdout(args.format(), args.pretty);

    let pipeline = Pipeline {
        analyzer: args.analyzer(),
        checker: ComplianceChecker::new(requirement, config),
        include_analysis: args.include_analysis,
    };
    let result = pipeline.process_images(&source, &provider, &output, &progress_bar);
    provider.dispose();
    result
}

/// The per-photo work of the check command, independent of the CLI adapters.
struct Pipeline {
    analyzer: ImageAnalyzer,
    checker: ComplianceChecker,
    include_analysis: bool,
}

impl Pipeline {
    /// Checks every photo of `source`, writing one report per photo.
    fn process_images(
        &self,
        source: &dyn ImageSource,
        provider: &dyn FaceGeometryProvider,
        output: &dyn ResultOutput,
        progress: &dyn ProgressSink,
    ) -> Result<CheckResult> {
        let total = source.count_hint();
        let mut processed = 0usize;
        let mut skipped = 0usize;
        let mut non_compliant = 0usize;

        for (index, image_result) in source.images().enumerate() {
            let image = match image_result {
                Ok(img) => img,
                Err(e) => {
                    // Note: error message contains the path via anyhow context
                    progress.on_event(ProgressEvent::Skipped {
                        path: format!("image {index}"),
                        reason: format!("{e:#}"),
                    });
                    skipped += 1;
                    continue;
                }
            };

            progress.on_event(ProgressEvent::Started {
                path: image.path.clone(),
                index,
                total,
            });

            let observation = match provider.observe(&image) {
                Ok(obs) => obs,
                Err(e) => {
                    warn!("Face data unusable for {}: {e:#}", image.path);
                    progress.on_event(ProgressEvent::Skipped {
                        path: image.path.clone(),
                        reason: format!("{e:#}"),
                    });
                    skipped += 1;
                    continue;
                }
            };

            let pixels = image.to_rgba8();
            let analysis = self.analyzer.analyze(Some(&pixels), observation);
            let result = self.checker.verify(&analysis);
            if !result.is_compliant {
                non_compliant += 1;
            }

            let report = ComplianceReport {
                path: image.path.clone(),
                timestamp: iso_timestamp(),
                standard: self.checker.requirement().code,
                dimensions: image.dimensions(),
                result,
                analysis: self.include_analysis.then_some(analysis),
            };

            output.write(&report)?;
            progress.on_event(ProgressEvent::Completed {
                report: Box::new(report),
            });
            processed += 1;
        }

        output.flush()?;
        progress.on_event(ProgressEvent::Finished { processed, skipped });

        let exit_code = if non_compliant > 0 {
            ExitCode::NonCompliant
        } else {
            ExitCode::Success
        };

        Ok(CheckResult {
            processed,
            skipped,
            non_compliant,
            exit_code,
        })
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use passport_qa_core::{FaceObservation, ImageInfo};
    use passport_qa_test_support::{
        MockFaceProvider, MockImageSource, MockProgressSink, MockResultOutput,
        SyntheticPortraitBuilder,
    };

    fn pipeline(code: StandardCode, include_analysis: bool) -> Pipeline {
        Pipeline {
            analyzer: ImageAnalyzer::default(),
            checker: ComplianceChecker::new(registry::get(code), ComplianceConfig::default()),
            include_analysis,
        }
    }

    fn ready(provider: MockFaceProvider) -> MockFaceProvider {
        let mut provider = provider;
        provider.init().unwrap();
        provider
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("0.25"), Ok(0.25));
        assert!(parse_fraction("1.5").is_err());
        assert!(parse_fraction("abc").is_err());
    }

    #[test]
    fn test_compliant_portrait_exits_success() {
        let portrait = SyntheticPortraitBuilder::new().build();
        let source = MockImageSource::new(vec![portrait.info.clone()]);
        let provider = ready(MockFaceProvider::new(portrait.observation.clone()));
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let result = pipeline(StandardCode::Us, false)
            .process_images(&source, &provider, &output, &progress)
            .unwrap();

        assert_eq!(result.processed, 1);
        assert_eq!(result.exit_code, ExitCode::Success);
        let reports = output.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].result.is_compliant, "{:?}", reports[0].result);
        assert!(reports[0].analysis.is_none());
        assert_eq!(output.flush_count(), 1);
        assert_eq!(progress.finished_counts(), Some((1, 0)));
    }

    #[test]
    fn test_missing_face_is_non_compliant() {
        let portrait = SyntheticPortraitBuilder::new().build();
        let source = MockImageSource::new(vec![portrait.info]);
        let provider = ready(MockFaceProvider::new(FaceObservation::default()));
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let result = pipeline(StandardCode::Us, true)
            .process_images(&source, &provider, &output, &progress)
            .unwrap();

        assert_eq!(result.non_compliant, 1);
        assert_eq!(result.exit_code, ExitCode::NonCompliant);
        assert!(output.reports()[0].analysis.is_some());
    }

    #[test]
    fn test_observe_error_skips_photo() {
        let source = MockImageSource::new(vec![ImageInfo::new(
            "a.png",
            image::DynamicImage::new_rgb8(8, 8),
        )]);
        // never initialized, so observe fails
        let provider = MockFaceProvider::new(FaceObservation::default());
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let result = pipeline(StandardCode::Us, false)
            .process_images(&source, &provider, &output, &progress)
            .unwrap();

        assert_eq!((result.processed, result.skipped), (0, 1));
        assert_eq!(result.exit_code, ExitCode::Success);
        assert!(output.reports().is_empty());
        assert_eq!(progress.skipped_count(), 1);
    }

    #[test]
    fn test_empty_source() {
        let source = MockImageSource::empty();
        let provider = ready(MockFaceProvider::new(FaceObservation::default()));
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();

        let result = pipeline(StandardCode::Uk, false)
            .process_images(&source, &provider, &output, &progress)
            .unwrap();

        assert_eq!(result.processed, 0);
        assert_eq!(result.exit_code, ExitCode::Success);
        assert!(progress.has_finished());
    }

    #[test]
    fn test_cli_thresholds_override_config() {
        let mut config = AppConfig::default();
        config.checks.sharpness_min = Some(0.3);
        config.checks.contrast_min = Some(0.2);
        let args = CheckArgs {
            paths: vec![],
            standard: None,
            recursive: false,
            faces_dir: None,
            detector: None,
            sharpness_min: Some(0.5),
            contrast_min: None,
            min_face_confidence: None,
            include_analysis: false,
            progress: false,
            quiet: false,
            format: None,
            pretty: false,
            config: None,
        };
        let args = CheckArgs::with_config(args, &config);
        let cfg = args.compliance_config();
        assert!((cfg.sharpness_min - 0.5).abs() < f64::EPSILON);
        assert!((cfg.contrast_min - 0.2).abs() < f64::EPSILON);
        assert_eq!(args.standard(), StandardCode::Us);
    }
}
