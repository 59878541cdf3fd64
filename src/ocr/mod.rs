pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{TesseractEngine, TextRecognizer};
pub use extract::{Reading, RegionReading, read_text_from_region};
pub use setup::ensure_tesseract;

use anyhow::Result;
use image::RgbImage;

use crate::config::{HudRegions, ToolConfig};

/// Builds the Tesseract engine described by the config.
///
/// Locating the executable and tessdata (and downloading tessdata on first
/// use) happens here, once; the returned engine is reused for every frame.
pub fn build_engine(config: &ToolConfig) -> Result<TesseractEngine> {
    let paths = ensure_tesseract(config)?;
    Ok(TesseractEngine::new(
        paths,
        &config.ocr_language,
        config.page_seg_mode,
    ))
}

/// Both HUD counters read from one frame.
#[derive(Debug)]
pub struct HudReading {
    pub health: RegionReading,
    pub score: RegionReading,
}

/// High-level function: frame → health and score readings.
pub fn read_hud<R: TextRecognizer + ?Sized>(
    recognizer: &R,
    frame: &RgbImage,
    regions: &HudRegions,
) -> HudReading {
    HudReading {
        health: read_text_from_region(recognizer, frame, &regions.health, "health"),
        score: read_text_from_region(recognizer, frame, &regions.score, "score"),
    }
}
