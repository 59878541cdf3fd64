use anyhow::{Error, Result};
use image::{DynamicImage, RgbImage};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::engine::TextRecognizer;
use super::preprocess::{crop_region, preprocess_crop};
use crate::config::PixelRect;
use crate::log;

/// Glyphs the recognizer commonly returns in place of digits on the HUD.
const DIGIT_CONFUSIONS: &[(char, char)] = &[('O', '0'), ('o', '0'), ('l', '1'), ('I', '1')];

fn digit_run_regex() -> Option<&'static Regex> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()
}

/// What was read from a region that produced recognizer output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reading {
    /// A numeric counter value
    Number(u64),
    /// Text with no digits in it; the first raw candidate, kept for inspection
    Unparsed(String),
    /// The recognizer found no text at all
    NoText,
}

/// Outcome of reading one region of one frame.
#[derive(Debug)]
pub enum RegionReading {
    Value(Reading),
    /// The region does not intersect the frame; nothing was recognized
    EmptyRegion,
    /// The recognizer itself failed
    RecognitionFailed(Error),
}

impl RegionReading {
    /// The numeric value, if one was read.
    pub fn number(&self) -> Option<u64> {
        match self {
            RegionReading::Value(Reading::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => write!(f, "{}", n),
            Reading::Unparsed(text) => write!(f, "{:?} (unparsed)", text),
            Reading::NoText => write!(f, "None"),
        }
    }
}

impl fmt::Display for RegionReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionReading::Value(reading) => write!(f, "{}", reading),
            RegionReading::EmptyRegion | RegionReading::RecognitionFailed(_) => write!(f, "None"),
        }
    }
}

/// Removes whitespace and maps look-alike letters to digits.
///
/// Idempotent: the replacements only ever produce digits.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            DIGIT_CONFUSIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// Returns the first run of ASCII digits in `text` as a number.
///
/// Runs too long for a `u64` are skipped.
pub fn first_number(text: &str) -> Option<u64> {
    digit_run_regex()?
        .find_iter(text)
        .find_map(|m| m.as_str().parse::<u64>().ok())
}

/// Parses one cleaned candidate: whole-string number first, then first digit run.
pub fn parse_number(cleaned: &str) -> Option<u64> {
    if !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = cleaned.parse::<u64>() {
            return Some(n);
        }
    }
    first_number(cleaned)
}

/// Turns recognizer candidates into a reading.
///
/// The first candidate with numeric content wins. Without any, the first raw
/// candidate is returned unparsed.
pub fn interpret_candidates(candidates: &[String]) -> Reading {
    for text in candidates {
        if let Some(n) = parse_number(&clean_text(text)) {
            return Reading::Number(n);
        }
    }
    match candidates.first() {
        Some(text) => Reading::Unparsed(text.clone()),
        None => Reading::NoText,
    }
}

/// Reads the counter shown inside `region` of `frame`.
///
/// Tries the thresholded crop first and the untouched color crop when that
/// yields nothing. Never fails: errors are logged with `label` and reported
/// as [`RegionReading::RecognitionFailed`].
pub fn read_text_from_region<R: TextRecognizer + ?Sized>(
    recognizer: &R,
    frame: &RgbImage,
    region: &PixelRect,
    label: &str,
) -> RegionReading {
    let Some(crop) = crop_region(frame, region) else {
        return RegionReading::EmptyRegion;
    };

    match recognize_crop(recognizer, crop) {
        Ok(candidates) => RegionReading::Value(interpret_candidates(&candidates)),
        Err(e) => {
            log(&format!("Error reading {}: {}", label, e));
            RegionReading::RecognitionFailed(e)
        }
    }
}

fn recognize_crop<R: TextRecognizer + ?Sized>(recognizer: &R, crop: RgbImage) -> Result<Vec<String>> {
    let thresholded = DynamicImage::ImageLuma8(preprocess_crop(&crop));
    let candidates = recognizer.recognize(&thresholded)?;
    if !candidates.is_empty() {
        return Ok(candidates);
    }

    recognizer.recognize(&DynamicImage::ImageRgb8(crop))
}
