//! Standards command - list the supported photo standards.

use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;
use passport_qa_core::domain::Unit;
use passport_qa_core::{registry, Requirement};

/// Arguments of the standards command.
#[derive(Args, Clone)]
pub struct StandardsArgs {
    /// Print the full requirements as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the standards command.
pub fn run(args: &StandardsArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(registry::list())?);
    } else {
        print!("{}", table(registry::list()));
    }
    Ok(())
}

fn size_label(req: &Requirement) -> String {
    let size = req.physical_size;
    match size.unit {
        Unit::Inch => format!("{}x{} in", size.width, size.height),
        Unit::Millimeter => format!("{}x{} mm", size.width, size.height),
    }
}

/// Plain-text overview, one standard per line.
fn table(requirements: &[Requirement]) -> String {
    let mut out = format!(
        "{:<4} {:<28} {:<10} {:<9} {:<9} {:<9} {}\n",
        "CODE", "NAME", "SIZE", "PIXELS", "HEAD %", "EYES %", "BACKGROUND"
    );
    for req in requirements {
        let (w, h) = req.output_pixels();
        let colors: Vec<_> = req
            .background
            .allowed_colors
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(
            out,
            "{:<4} {:<28} {:<10} {:<9} {:<9} {:<9} {}",
            req.code,
            req.name,
            size_label(req),
            format!("{w}x{h}"),
            format!("{}-{}", req.head_height.min, req.head_height.max),
            format!("{}-{}", req.eye_line.min, req.eye_line.max),
            colors.join(" ")
        );
    }
    out
}
