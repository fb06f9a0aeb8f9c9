//! Export command - crop a photo to a standard and lay it out for printing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use passport_qa_adapters::{load_image, DetectorFormat, PngExportSink, SidecarFaceProvider};
use passport_qa_core::render::MIN_ZOOM;
use passport_qa_core::{
    calculate_crop, registry, render_photo, render_sheet, Adjustments, CropParams, ExportSink,
    FaceGeometryProvider, FaceObservation, ImageInfo, Requirement, StandardCode, Watermark,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Watermark text used by `--preview` when the config names none.
const PREVIEW_TEXT: &str = "PREVIEW";

fn parse_zoom(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (MIN_ZOOM..=10.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {MIN_ZOOM}..=10.0"))
    }
}

fn parse_pan(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in -1.0..=1.0"))
    }
}

fn parse_brightness(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value <= 3.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not in (0.0, 3.0]"))
    }
}

/// Arguments of the export command.
#[derive(Args, Clone)]
pub struct ExportArgs {
    /// Photo to export
    pub image: PathBuf,

    /// Standard to export for (us, uk, eu, ca, in, cn, au, jp)
    #[arg(short, long)]
    pub standard: Option<StandardCode>,

    /// Magnification applied to the computed crop
    #[arg(long, default_value_t = 1.0, value_parser = parse_zoom)]
    pub zoom: f64,

    /// Horizontal shift as a fraction of crop width (-1.0-1.0)
    #[arg(long, default_value_t = 0.0, value_parser = parse_pan, allow_negative_numbers = true)]
    pub pan_x: f64,

    /// Vertical shift as a fraction of crop height (-1.0-1.0)
    #[arg(long, default_value_t = 0.0, value_parser = parse_pan, allow_negative_numbers = true)]
    pub pan_y: f64,

    /// Brightness multiplier
    #[arg(long, default_value_t = 1.0, value_parser = parse_brightness)]
    pub brightness: f64,

    /// Copies on the print sheet (default: as many as fit)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub copies: Option<u32>,

    /// Stamp this text across the photo and the sheet
    #[arg(long, value_name = "TEXT", conflicts_with = "preview")]
    pub watermark: Option<String>,

    /// Stamp the configured preview watermark
    #[arg(long)]
    pub preview: bool,

    /// Output directory (default: next to the photo)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory holding `<stem>.face.json` detector output
    #[arg(long, value_name = "DIR")]
    pub faces_dir: Option<PathBuf>,

    /// Detector output format (auto-detected when omitted)
    #[arg(long)]
    pub detector: Option<DetectorFormat>,

    /// Pretty-print the summary
    #[arg(long)]
    pub pretty: bool,
}

/// A written raster.
#[derive(Debug, Serialize)]
pub struct ExportedImage {
    /// Where it was written.
    pub path: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// The written sheet and its fill.
#[derive(Debug, Serialize)]
pub struct ExportedSheet {
    /// The raster.
    #[serde(flatten)]
    pub image: ExportedImage,
    /// Copies placed.
    pub placed: usize,
    /// Copies that would fit.
    pub capacity: u32,
}

/// What the export command printed to stdout.
#[derive(Debug, Serialize)]
pub struct ExportSummary {
    /// Source photo.
    pub source: String,
    /// Standard exported for.
    pub standard: StandardCode,
    /// Whether detector output was used to place the crop.
    pub face_detected: bool,
    /// Crop in source pixels.
    pub crop: CropParams,
    /// Applied fine-tuning.
    pub adjustments: Adjustments,
    /// The single photo.
    pub photo: ExportedImage,
    /// The print sheet.
    pub sheet: ExportedSheet,
}

/// Everything needed to render one export.
pub struct ExportJob<'a> {
    /// Standard to render for.
    pub requirement: &'static Requirement,
    /// Fine-tuning on top of the crop.
    pub adjustments: Adjustments,
    /// Copies on the sheet; `None` fills it.
    pub copies: Option<u32>,
    /// Optional watermark.
    pub watermark: Option<Watermark>,
    /// Base name for written files.
    pub name: &'a str,
}

impl ExportJob<'_> {
    /// Renders and writes the photo and the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot write.
    pub fn run(
        &self,
        image: &ImageInfo,
        observation: &FaceObservation,
        sink: &dyn ExportSink,
    ) -> Result<ExportSummary> {
        let geometry = observation.geometry.as_ref();
        let face_detected = geometry.and_then(|g| g.usable_box()).is_some();
        let crop = calculate_crop(image.width, image.height, geometry, self.requirement);
        debug!(?crop, face_detected, "computed crop");

        let pixels = image.to_rgba8();
        let clean = render_photo(&pixels, &crop, &self.adjustments, self.requirement, None);
        let photo = match &self.watermark {
            Some(mark) => passport_qa_core::render::apply_watermark(clean.clone(), mark),
            None => clean.clone(),
        };
        let (sheet, layout) = render_sheet(
            &clean,
            self.copies.unwrap_or(u32::MAX),
            self.watermark.as_ref(),
        );

        let code = self.requirement.code;
        let photo_path = sink.write(&format!("{}_{code}_photo", self.name), &photo)?;
        let sheet_path = sink.write(&format!("{}_{code}_sheet", self.name), &sheet)?;

        Ok(ExportSummary {
            source: image.path.clone(),
            standard: code,
            face_detected,
            crop,
            adjustments: self.adjustments,
            photo: ExportedImage {
                path: photo_path,
                width: photo.width(),
                height: photo.height(),
            },
            sheet: ExportedSheet {
                image: ExportedImage {
                    path: sheet_path,
                    width: sheet.width(),
                    height: sheet.height(),
                },
                placed: layout.placed(),
                capacity: layout.capacity,
            },
        })
    }
}

/// Run the export command.
pub fn run(args: &ExportArgs, config: &AppConfig) -> Result<()> {
    let standard = args
        .standard
        .or_else(|| config.standard())
        .unwrap_or(StandardCode::Us);
    let requirement = registry::get(standard);
    info!("Exporting {} for {}", args.image.display(), requirement.name);

    let image = load_image(&args.image)?;

    let faces_dir = args
        .faces_dir
        .clone()
        .or_else(|| config.general.faces_dir.clone());
    let detector = args.detector.or_else(|| {
        config
            .general
            .detector
            .as_deref()
            .and_then(|s| s.parse().ok())
    });
    let mut provider = SidecarFaceProvider::new(faces_dir, detector);
    provider
        .init()
        .context("Failed to start the face provider")?;
    let observation = provider.observe(&image);
    provider.dispose();
    let observation = observation?;

    let watermark = if args.preview {
        Some(Watermark::new(
            config
                .export
                .watermark
                .clone()
                .unwrap_or_else(|| PREVIEW_TEXT.to_string()),
        ))
    } else {
        args.watermark.clone().map(Watermark::new)
    };

    let name = args
        .image
        .file_stem()
        .map_or_else(|| "photo".to_string(), |s| s.to_string_lossy().into_owned());
    let out_dir = args.out_dir.clone().unwrap_or_else(|| {
        args.image
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });

    let job = ExportJob {
        requirement,
        adjustments: Adjustments {
            zoom: args.zoom,
            pan_x: args.pan_x,
            pan_y: args.pan_y,
            brightness: args.brightness,
        },
        copies: args.copies.or(config.export.copies),
        watermark,
        name: &name,
    };
    let summary = job.run(&image, &observation, &PngExportSink::new(out_dir))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use passport_qa_test_support::{MockExportSink, SyntheticPortraitBuilder};

    fn job(code: StandardCode, copies: Option<u32>) -> ExportJob<'static> {
        ExportJob {
            requirement: registry::get(code),
            adjustments: Adjustments::default(),
            copies,
            watermark: None,
            name: "anna",
        }
    }

    #[test]
    fn test_parsers() {
        assert!(parse_zoom("0.05").is_err());
        assert_eq!(parse_zoom("2"), Ok(2.0));
        assert_eq!(parse_pan("-0.5"), Ok(-0.5));
        assert!(parse_pan("1.5").is_err());
        assert!(parse_brightness("0").is_err());
        assert_eq!(parse_brightness("1.2"), Ok(1.2));
    }

    #[test]
    fn test_us_export_fills_sheet() {
        let portrait = SyntheticPortraitBuilder::new().build();
        let sink = MockExportSink::new();

        let summary = job(StandardCode::Us, None)
            .run(&portrait.info, &portrait.observation, &sink)
            .unwrap();

        assert!(summary.face_detected);
        assert_eq!((summary.photo.width, summary.photo.height), (600, 600));
        assert_eq!(summary.sheet.placed, 6);
        assert_eq!(summary.sheet.capacity, 6);
        assert_eq!(
            sink.written(),
            vec![
                ("anna_us_photo".to_string(), (600, 600)),
                ("anna_us_sheet".to_string(), (1800, 1200)),
            ]
        );
    }

    #[test]
    fn test_copies_are_limited() {
        let portrait = SyntheticPortraitBuilder::new().build();
        let sink = MockExportSink::new();

        let summary = job(StandardCode::Uk, Some(2))
            .run(&portrait.info, &portrait.observation, &sink)
            .unwrap();

        assert_eq!(summary.sheet.placed, 2);
        assert!(summary.sheet.capacity >= 2);
    }

    #[test]
    fn test_without_face_uses_centered_crop() {
        let portrait = SyntheticPortraitBuilder::new().size(800, 600).build();
        let sink = MockExportSink::new();

        let summary = job(StandardCode::Us, Some(1))
            .run(&portrait.info, &FaceObservation::default(), &sink)
            .unwrap();

        assert!(!summary.face_detected);
        assert_eq!(summary.crop.crop_w, 600);
        assert_eq!(summary.crop.crop_h, 600);
        assert_eq!(summary.crop.crop_x, 100);
    }
}
