//! Reads one HUD region from a single screenshot.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use neckdeep_tools::config::{PixelRect, load_config, load_coords, region_from_coords};
use neckdeep_tools::ocr::{build_engine, read_text_from_region};
use neckdeep_tools::{install_panic_hook, log, paths};

/// Region around the health digits on a 1080p capture.
const DEFAULT_REGION: PixelRect = PixelRect::new(125, 150, 160, 175);

#[derive(Parser, Debug)]
#[command(
    name = "read_region",
    version,
    about = "OCR one region of a saved frame"
)]
struct Args {
    /// Frame to read
    #[arg(long, default_value = "frame.png")]
    image: PathBuf,

    /// Name printed with the result; also the key prefix looked up in --coords
    #[arg(long, default_value = "Health")]
    label: String,

    /// Coords file (key=value) to take the region from
    #[arg(long)]
    coords: Option<PathBuf>,

    #[arg(long)]
    x1: Option<u32>,
    #[arg(long)]
    y1: Option<u32>,
    #[arg(long)]
    x2: Option<u32>,
    #[arg(long)]
    y2: Option<u32>,
}

impl Args {
    /// Coords file first, then individual flags on top.
    fn region(&self) -> PixelRect {
        let base = match &self.coords {
            Some(path) => region_from_coords(&load_coords(path), &self.label.to_lowercase(), DEFAULT_REGION),
            None => DEFAULT_REGION,
        };
        PixelRect {
            x1: self.x1.unwrap_or(base.x1),
            y1: self.y1.unwrap_or(base.y1),
            x2: self.x2.unwrap_or(base.x2),
            y2: self.y2.unwrap_or(base.y2),
        }
    }
}

fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    let args = Args::parse();
    let region = args.region();

    let frame = image::open(&args.image)
        .with_context(|| format!("Could not open image {}", args.image.display()))?
        .to_rgb8();
    log(&format!(
        "Reading {} from {} at {}",
        args.label,
        args.image.display(),
        region
    ));

    let config = load_config();
    let engine = build_engine(&config).context("OCR engine unavailable")?;

    let reading = read_text_from_region(&engine, &frame, &region, &args.label);
    println!("{}: {}", args.label, reading);
    Ok(())
}
