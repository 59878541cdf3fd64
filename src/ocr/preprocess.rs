use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

use crate::config::PixelRect;

/// Crops a pixel rectangle out of a frame.
///
/// The rectangle is clipped to the frame like a slice would be. Returns
/// `None` when the visible part is empty.
pub fn crop_region(frame: &RgbImage, region: &PixelRect) -> Option<RgbImage> {
    let (w, h) = frame.dimensions();
    let (x, y, cw, ch) = region.clamp_to(w, h)?;
    Some(image::imageops::crop_imm(frame, x, y, cw, ch).to_image())
}

/// Converts to a single intensity channel.
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Binarizes a grayscale image at its Otsu level.
///
/// The split point maximizes between-class variance for this image alone.
/// Pixels above the level become white (255), the rest black (0).
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}

/// Grayscale + automatic threshold, the form handed to the recognizer first.
pub fn preprocess_crop(crop: &RgbImage) -> GrayImage {
    otsu_binarize(&to_grayscale(crop))
}
