//! Configuration file support for passport-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/passport-qa/config.toml` (lowest priority)
//! - Project-local: `.passport-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use passport_qa_adapters::DetectorFormat;
use passport_qa_core::analysis::AnalyzerConfig;
use passport_qa_core::compliance::ComplianceConfig;
use passport_qa_core::StandardCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Analyzer settings.
    pub analysis: AnalysisConfig,
    /// Exposure classification settings.
    pub exposure: ExposureConfig,
    /// Halo detection settings.
    pub halo: HaloConfig,
    /// Compliance thresholds.
    pub checks: ChecksConfig,
    /// Print export settings.
    pub export: ExportConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default standard code, e.g. "us".
    pub standard: Option<String>,
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Directory holding `<stem>.face.json` files.
    pub faces_dir: Option<PathBuf>,
    /// Detector format of the face files: "canonical", "mediapipe" or "face-api".
    pub detector: Option<String>,
}

/// Analyzer configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Larger side beyond which images are downscaled for sharpness.
    pub sharpness_max_dimension: Option<u32>,
    /// Corner sample size as a fraction of width and height.
    pub corner_fraction: Option<f64>,
    /// Mean chroma below which an image is grayscale.
    pub grayscale_threshold: Option<f64>,
}

/// Exposure classification configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Mean luminance above which an image is overexposed.
    pub over_mean: Option<f64>,
    /// Mean luminance below which an image is underexposed.
    pub under_mean: Option<f64>,
    /// Highlight clip level (0-255).
    pub highlight_clip_level: Option<u8>,
    /// Clipped highlight fraction that counts as overexposed.
    pub max_highlight_fraction: Option<f64>,
    /// Shadow clip level (0-255).
    pub shadow_clip_level: Option<u8>,
    /// Crushed shadow fraction that counts as underexposed.
    pub max_shadow_fraction: Option<f64>,
}

/// Halo detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    /// Ring thickness as a fraction of face width.
    pub ring_fraction: Option<f64>,
    /// Inner band thickness as a fraction of face width.
    pub band_fraction: Option<f64>,
    /// Ring luminance excess that counts as a halo.
    pub min_excess: Option<f64>,
    /// Excess that maps to a score of 100.
    pub full_scale_excess: Option<f64>,
    /// Ridge neighbour distance in pixels.
    pub ridge_reach: Option<usize>,
    /// Ridge pixel fraction that counts as a halo.
    pub max_ridge_fraction: Option<f64>,
}

/// Compliance threshold configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Lowest acceptable mean luminance.
    pub brightness_min: Option<f64>,
    /// Highest acceptable mean luminance.
    pub brightness_max: Option<f64>,
    /// Lowest acceptable sharpness (0.0-1.0).
    pub sharpness_min: Option<f64>,
    /// Lowest acceptable contrast (0.0-1.0).
    pub contrast_min: Option<f64>,
    /// Largest acceptable head rotation in degrees.
    pub max_rotation_degrees: Option<f64>,
    /// Largest acceptable eye-line tilt in degrees.
    pub max_eye_tilt_degrees: Option<f64>,
    /// Detector confidence below which a face only warns.
    pub min_face_confidence: Option<f64>,
}

/// Print export configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Copies on the print sheet.
    pub copies: Option<u32>,
    /// Watermark text for previews.
    pub watermark: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Include the raw measurements in each report.
    pub analysis: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/passport-qa/config.toml`
    /// 2. Project-local: `.passport-qa.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Analyzer settings with file values layered over the defaults.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let mut cfg = AnalyzerConfig::default();
        let a = &self.analysis;
        if let Some(v) = a.sharpness_max_dimension {
            cfg.sharpness.max_dimension = v;
        }
        if let Some(v) = a.corner_fraction {
            cfg.background.corner_fraction = v;
        }
        if let Some(v) = a.grayscale_threshold {
            cfg.grayscale_threshold = v;
        }

        let e = &self.exposure;
        let x = &mut cfg.exposure;
        x.over_mean = e.over_mean.unwrap_or(x.over_mean);
        x.under_mean = e.under_mean.unwrap_or(x.under_mean);
        x.highlight_clip_level = e.highlight_clip_level.unwrap_or(x.highlight_clip_level);
        x.max_highlight_fraction = e.max_highlight_fraction.unwrap_or(x.max_highlight_fraction);
        x.shadow_clip_level = e.shadow_clip_level.unwrap_or(x.shadow_clip_level);
        x.max_shadow_fraction = e.max_shadow_fraction.unwrap_or(x.max_shadow_fraction);

        let h = &self.halo;
        let y = &mut cfg.halo;
        y.ring_fraction = h.ring_fraction.unwrap_or(y.ring_fraction);
        y.band_fraction = h.band_fraction.unwrap_or(y.band_fraction);
        y.min_excess = h.min_excess.unwrap_or(y.min_excess);
        y.full_scale_excess = h.full_scale_excess.unwrap_or(y.full_scale_excess);
        y.ridge_reach = h.ridge_reach.unwrap_or(y.ridge_reach);
        y.max_ridge_fraction = h.max_ridge_fraction.unwrap_or(y.max_ridge_fraction);
        cfg
    }

    /// The configured default standard, if it names a known one.
    ///
    /// An unknown code is logged and ignored, so callers fall back to their
    /// own default.
    pub fn standard(&self) -> Option<StandardCode> {
        let code = self.general.standard.as_deref()?;
        match code.parse() {
            Ok(standard) => Some(standard),
            Err(e) => {
                warn!("Ignoring general.standard ({e}), falling back to {}", StandardCode::Us);
                None
            }
        }
    }

    /// Compliance thresholds with file values layered over the defaults.
    pub fn compliance_config(&self) -> ComplianceConfig {
        let c = &self.checks;
        let d = ComplianceConfig::default();
        ComplianceConfig {
            brightness_min: c.brightness_min.unwrap_or(d.brightness_min),
            brightness_max: c.brightness_max.unwrap_or(d.brightness_max),
            sharpness_min: c.sharpness_min.unwrap_or(d.sharpness_min),
            contrast_min: c.contrast_min.unwrap_or(d.contrast_min),
            max_rotation_degrees: c.max_rotation_degrees.unwrap_or(d.max_rotation_degrees),
            max_eye_tilt_degrees: c.max_eye_tilt_degrees.unwrap_or(d.max_eye_tilt_degrees),
            min_face_confidence: c.min_face_confidence.unwrap_or(d.min_face_confidence),
        }
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref s) = self.general.standard {
            s.parse::<StandardCode>()
                .map_err(|e| format!("general.standard: {e}"))?;
        }
        if let Some(ref d) = self.general.detector {
            d.parse::<DetectorFormat>()
                .map_err(|e| format!("general.detector: {e}"))?;
        }
        if let Some(f) = self.analysis.corner_fraction {
            if !(f > 0.0 && f <= 0.5) {
                return Err(format!("analysis.corner_fraction must be in (0, 0.5], got {f}"));
            }
        }
        if self.analysis.sharpness_max_dimension == Some(0) {
            return Err("analysis.sharpness_max_dimension must be positive".to_string());
        }
        for (name, value) in [
            (
                "exposure.max_highlight_fraction",
                self.exposure.max_highlight_fraction,
            ),
            (
                "exposure.max_shadow_fraction",
                self.exposure.max_shadow_fraction,
            ),
            ("halo.max_ridge_fraction", self.halo.max_ridge_fraction),
        ] {
            if let Some(t) = value {
                if !(0.0..=1.0).contains(&t) {
                    return Err(format!("{name} must be 0.0-1.0, got {t}"));
                }
            }
        }
        if let Some(s) = self.halo.full_scale_excess {
            if s <= 0.0 {
                return Err(format!("halo.full_scale_excess must be positive, got {s}"));
            }
        }
        self.compliance_config()
            .validate()
            .map_err(|e| format!("checks: {e}"))?;

        if self.export.copies == Some(0) {
            return Err("export.copies must be at least 1".to_string());
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        let Self {
            general,
            analysis,
            exposure,
            halo,
            checks,
            export,
            output,
        } = other;

        self.general.standard = general.standard.or_else(|| self.general.standard.take());
        self.general.recursive = general.recursive.or(self.general.recursive);
        self.general.faces_dir = general.faces_dir.or_else(|| self.general.faces_dir.take());
        self.general.detector = general.detector.or_else(|| self.general.detector.take());

        let a = &mut self.analysis;
        a.sharpness_max_dimension = analysis.sharpness_max_dimension.or(a.sharpness_max_dimension);
        a.corner_fraction = analysis.corner_fraction.or(a.corner_fraction);
        a.grayscale_threshold = analysis.grayscale_threshold.or(a.grayscale_threshold);

        let e = &mut self.exposure;
        e.over_mean = exposure.over_mean.or(e.over_mean);
        e.under_mean = exposure.under_mean.or(e.under_mean);
        e.highlight_clip_level = exposure.highlight_clip_level.or(e.highlight_clip_level);
        e.max_highlight_fraction = exposure.max_highlight_fraction.or(e.max_highlight_fraction);
        e.shadow_clip_level = exposure.shadow_clip_level.or(e.shadow_clip_level);
        e.max_shadow_fraction = exposure.max_shadow_fraction.or(e.max_shadow_fraction);

        let h = &mut self.halo;
        h.ring_fraction = halo.ring_fraction.or(h.ring_fraction);
        h.band_fraction = halo.band_fraction.or(h.band_fraction);
        h.min_excess = halo.min_excess.or(h.min_excess);
        h.full_scale_excess = halo.full_scale_excess.or(h.full_scale_excess);
        h.ridge_reach = halo.ridge_reach.or(h.ridge_reach);
        h.max_ridge_fraction = halo.max_ridge_fraction.or(h.max_ridge_fraction);

        let c = &mut self.checks;
        c.brightness_min = checks.brightness_min.or(c.brightness_min);
        c.brightness_max = checks.brightness_max.or(c.brightness_max);
        c.sharpness_min = checks.sharpness_min.or(c.sharpness_min);
        c.contrast_min = checks.contrast_min.or(c.contrast_min);
        c.max_rotation_degrees = checks.max_rotation_degrees.or(c.max_rotation_degrees);
        c.max_eye_tilt_degrees = checks.max_eye_tilt_degrees.or(c.max_eye_tilt_degrees);
        c.min_face_confidence = checks.min_face_confidence.or(c.min_face_confidence);

        self.export.copies = export.copies.or(self.export.copies);
        self.export.watermark = export.watermark.or_else(|| self.export.watermark.take());

        self.output.format = output.format.or_else(|| self.output.format.take());
        self.output.pretty = output.pretty.or(self.output.pretty);
        self.output.analysis = output.analysis.or(self.output.analysis);
        self.output.progress = output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("passport-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.passport-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".passport-qa.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_core_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.analyzer_config(), AnalyzerConfig::default());
        assert_eq!(config.compliance_config(), ComplianceConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.general.standard.is_none());
        assert!(config.checks.sharpness_min.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
standard = 'uk'
recursive = true
faces_dir = '/tmp/faces'
detector = 'mediapipe'

[analysis]
sharpness_max_dimension = 512
corner_fraction = 0.08
grayscale_threshold = 4.0

[exposure]
over_mean = 210.0
under_mean = 50.0
highlight_clip_level = 248
max_highlight_fraction = 0.4
shadow_clip_level = 8
max_shadow_fraction = 0.3

[halo]
ring_fraction = 0.05
min_excess = 20.0
ridge_reach = 2

[checks]
brightness_min = 70.0
brightness_max = 230.0
sharpness_min = 0.1
contrast_min = 0.15
max_rotation_degrees = 10.0
max_eye_tilt_degrees = 5.0
min_face_confidence = 0.7

[export]
copies = 4
watermark = 'SAMPLE'

[output]
format = 'json'
pretty = true
analysis = true
progress = false
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");
        assert!(config.validate().is_ok());

        assert_eq!(config.general.standard.as_deref(), Some("uk"));
        assert_eq!(config.general.faces_dir, Some(PathBuf::from("/tmp/faces")));
        assert_eq!(config.export.copies, Some(4));
        assert_eq!(config.output.analysis, Some(true));

        let analyzer = config.analyzer_config();
        assert_eq!(analyzer.sharpness.max_dimension, 512);
        assert_eq!(analyzer.background.corner_fraction, 0.08);
        assert_eq!(analyzer.exposure.highlight_clip_level, 248);
        assert_eq!(analyzer.halo.ridge_reach, 2);
        // untouched halo values keep their defaults
        assert_eq!(analyzer.halo.band_fraction, 0.1);

        let checks = config.compliance_config();
        assert_eq!(checks.brightness_min, 70.0);
        assert_eq!(checks.max_eye_tilt_degrees, 5.0);
    }

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r"
[general]
standard = 'us'

[checks]
sharpness_min = 0.1
contrast_min = 0.2
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[general]
standard = 'eu'

[checks]
sharpness_min = 0.05

[export]
watermark = 'DRAFT'
",
        )
        .expect("parse override");

        base.merge(override_config);

        assert_eq!(base.general.standard.as_deref(), Some("eu"));
        assert_eq!(base.checks.sharpness_min, Some(0.05));
        assert_eq!(base.checks.contrast_min, Some(0.2));
        assert_eq!(base.export.watermark.as_deref(), Some("DRAFT"));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[halo]
min_excess = 25.0

[output]
format = 'json'
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.halo.min_excess, Some(25.0));
        assert_eq!(base.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let toml = r"
[checks
sharpness_min = 0.5
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[export]
copies = "many"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_validate_unknown_standard() {
        let mut config = AppConfig::default();
        config.general.standard = Some("xx".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("general.standard"));
    }

    #[test]
    fn test_standard_ignores_unknown_code() {
        let mut config = AppConfig::default();
        assert_eq!(config.standard(), None);
        config.general.standard = Some("GB".to_string());
        assert_eq!(config.standard(), Some(StandardCode::Uk));
        config.general.standard = Some("mars".to_string());
        assert_eq!(config.standard(), None);
    }

    #[test]
    fn test_validate_unknown_detector() {
        let mut config = AppConfig::default();
        config.general.detector = Some("opencv".to_string());
        assert!(config.validate().unwrap_err().contains("general.detector"));
    }

    #[test]
    fn test_validate_brightness_window() {
        let mut config = AppConfig::default();
        config.checks.brightness_min = Some(240.0);
        assert!(config.validate().unwrap_err().contains("checks"));
    }

    #[test]
    fn test_validate_fractions() {
        let mut config = AppConfig::default();
        config.exposure.max_highlight_fraction = Some(1.5);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("exposure.max_highlight_fraction"));

        let mut config = AppConfig::default();
        config.analysis.corner_fraction = Some(0.0);
        assert!(config.validate().unwrap_err().contains("corner_fraction"));
    }

    #[test]
    fn test_validate_copies_and_format() {
        let mut config = AppConfig::default();
        config.export.copies = Some(0);
        assert!(config.validate().unwrap_err().contains("export.copies"));

        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());
        assert!(config.validate().unwrap_err().contains("output.format"));
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".passport-qa.toml"), "").unwrap();
        assert_eq!(
            find_config_in_parents(&nested),
            Some(dir.path().join(".passport-qa.toml"))
        );
    }
}
