//! Sequential frame sources.
//!
//! Videos are decoded by an `ffmpeg` child process piping raw RGB frames;
//! still images yield a single frame. Both sit behind [`FrameSource`] so the
//! sampler and the OCR loop never care where frames come from.

pub mod decoder;
pub mod probe;

pub use decoder::{FfmpegDecoder, FfmpegTools};
pub use probe::{VideoInfo, probe_video};

use anyhow::{Context, Result, anyhow};
use image::RgbImage;
use std::path::Path;

/// Extensions opened as a single still image instead of a video.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

/// A finite, forward-only sequence of frames.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// A source that yields one decoded image and then ends.
pub struct StillImage {
    frame: Option<RgbImage>,
}

impl StillImage {
    pub fn new(frame: RgbImage) -> Self {
        Self { frame: Some(frame) }
    }

    /// Loads an image from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("Could not open image {}", path.display()))?;
        Ok(Self::new(img.to_rgb8()))
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frame.take())
    }
}

/// Returns true if the path looks like a still image rather than a video.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Opens a video or a still image as a frame source.
///
/// Fails if the file does not exist or cannot be decoded.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource + Send>> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    if is_image_path(path) {
        Ok(Box::new(StillImage::open(path)?))
    } else {
        Ok(Box::new(FfmpegDecoder::open(path)?))
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use image::Rgb;

    /// In-memory video: `count` solid frames whose red channel encodes the index.
    pub struct SyntheticVideo {
        pub width: u32,
        pub height: u32,
        pub count: u64,
        pub next: u64,
    }

    impl SyntheticVideo {
        pub fn new(count: u64) -> Self {
            Self {
                width: 64,
                height: 48,
                count,
                next: 0,
            }
        }
    }

    impl FrameSource for SyntheticVideo {
        fn next_frame(&mut self) -> Result<Option<RgbImage>> {
            if self.next >= self.count {
                return Ok(None);
            }
            let value = (self.next % 256) as u8;
            self.next += 1;
            Ok(Some(RgbImage::from_pixel(
                self.width,
                self.height,
                Rgb([value, 0, 0]),
            )))
        }
    }
}
