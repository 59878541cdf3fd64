//! General settings loaded from config.json.
//!
//! Every field has a default so a partial (or missing) file still works.
//! Command-line flags override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::log;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolConfig {
    /// OCR test: process every Nth frame
    #[serde(default = "default_frame_interval")]
    pub frame_interval: u64,
    /// Frame sampler: keep every Nth frame
    #[serde(default = "default_sample_stride")]
    pub sample_stride: u64,
    /// Preview frames wider than this are scaled down
    #[serde(default = "default_max_display_width")]
    pub max_display_width: u32,
    /// Coords file for the health counter
    #[serde(default = "default_health_coords")]
    pub health_coords: PathBuf,
    /// Coords file for the score counter
    #[serde(default = "default_score_coords")]
    pub score_coords: PathBuf,
    /// Explicit tesseract executable; searched for when unset
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; searched for when unset
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    /// Tesseract page segmentation mode (7 = single text line)
    #[serde(default = "default_page_seg_mode")]
    pub page_seg_mode: u8,
}

fn default_frame_interval() -> u64 {
    30
}

fn default_sample_stride() -> u64 {
    100
}

fn default_max_display_width() -> u32 {
    1280
}

fn default_health_coords() -> PathBuf {
    PathBuf::from("Health").join("Coords.txt")
}

fn default_score_coords() -> PathBuf {
    PathBuf::from("Score").join("Coords.txt")
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_page_seg_mode() -> u8 {
    7
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            frame_interval: default_frame_interval(),
            sample_stride: default_sample_stride(),
            max_display_width: default_max_display_width(),
            health_coords: default_health_coords(),
            score_coords: default_score_coords(),
            tesseract_path: None,
            tessdata_dir: None,
            ocr_language: default_ocr_language(),
            page_seg_mode: default_page_seg_mode(),
        }
    }
}

/// Loads configuration from config.json next to the executable, or defaults.
pub fn load_config() -> ToolConfig {
    load_config_from(&crate::paths::get_config_path())
}

/// Loads configuration from the given path. Falls back to defaults on any error.
pub fn load_config_from(config_path: &Path) -> ToolConfig {
    if !config_path.exists() {
        log(&format!(
            "{} not found. Using default config.",
            config_path.display()
        ));
        return ToolConfig::default();
    }

    match fs::read_to_string(config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log(&format!("Config loaded from {}", config_path.display()));
                config
            }
            Err(e) => {
                log(&format!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
                ToolConfig::default()
            }
        },
        Err(e) => {
            log(&format!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            ));
            ToolConfig::default()
        }
    }
}
