//! HUD region coordinates.
//!
//! Coords files are plain `key=value` lines, e.g.
//!
//! ```text
//! score_x1=115
//! score_y1=150
//! score_x2=400
//! score_y2=175
//! ```
//!
//! Both the health and the score file historically use the `score_` prefix,
//! so lookups try `<field>_x1` first and then `score_x1`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::log;

/// Prefix used by the existing coords files regardless of field.
const LEGACY_PREFIX: &str = "score";

/// An axis-aligned rectangle in frame pixel coordinates, `x1..x2` × `y1..y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Intersects the rectangle with a `width` × `height` frame.
    ///
    /// Returns `(x, y, w, h)` of the visible part, or `None` when nothing of
    /// the rectangle lies inside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// The two HUD counters read from every processed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudRegions {
    pub health: PixelRect,
    pub score: PixelRect,
}

impl HudRegions {
    pub const DEFAULT_HEALTH: PixelRect = PixelRect::new(115, 150, 400, 175);
    pub const DEFAULT_SCORE: PixelRect = PixelRect::new(100, 125, 400, 150);

    /// Loads both regions from their coords files, falling back per key.
    pub fn load(health_file: &Path, score_file: &Path) -> Self {
        let health = region_from_coords(&load_coords(health_file), "health", Self::DEFAULT_HEALTH);
        let score = region_from_coords(&load_coords(score_file), "score", Self::DEFAULT_SCORE);
        Self { health, score }
    }
}

impl Default for HudRegions {
    fn default() -> Self {
        Self {
            health: Self::DEFAULT_HEALTH,
            score: Self::DEFAULT_SCORE,
        }
    }
}

/// Reads a coords file into a key → value map.
///
/// A missing file yields an empty map. Lines without `=` are ignored and
/// lines whose value is not a non-negative integer are skipped with a log line.
pub fn load_coords(path: &Path) -> HashMap<String, u32> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_coords(&contents, path),
        Err(_) => {
            log(&format!(
                "Coords file {} not found, using defaults",
                path.display()
            ));
            HashMap::new()
        }
    }
}

fn parse_coords(contents: &str, source: &Path) -> HashMap<String, u32> {
    let mut coords = HashMap::new();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        match value.trim().parse::<u32>() {
            Ok(v) => {
                coords.insert(key.to_string(), v);
            }
            Err(_) => log(&format!(
                "Ignoring malformed coords line in {}: {}",
                source.display(),
                line.trim()
            )),
        }
    }
    coords
}

/// Builds the rectangle for `field` from a coords map.
///
/// Each corner is looked up as `<field>_x1`, then `score_x1`, then taken from
/// `default`.
pub fn region_from_coords(coords: &HashMap<String, u32>, field: &str, default: PixelRect) -> PixelRect {
    let lookup = |suffix: &str, fallback: u32| {
        coords
            .get(&format!("{}_{}", field, suffix))
            .or_else(|| coords.get(&format!("{}_{}", LEGACY_PREFIX, suffix)))
            .copied()
            .unwrap_or(fallback)
    };

    PixelRect {
        x1: lookup("x1", default.x1),
        y1: lookup("y1", default.y1),
        x2: lookup("x2", default.x2),
        y2: lookup("y2", default.y2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_coords() {
        let coords = parse_coords(
            "score_x1=115\nscore_y1 = 150\n\nnot a pair\nscore_x2=abc\n",
            Path::new("Coords.txt"),
        );
        assert_eq!(coords.get("score_x1"), Some(&115));
        assert_eq!(coords.get("score_y1"), Some(&150));
        assert!(!coords.contains_key("score_x2"));
        assert_eq!(coords.len(), 2);
    }

    #[test]
    fn test_region_prefers_field_keys_then_legacy_then_default() {
        let mut coords = HashMap::new();
        coords.insert("health_x1".to_string(), 10);
        coords.insert("score_x1".to_string(), 99);
        coords.insert("score_y1".to_string(), 20);

        let rect = region_from_coords(&coords, "health", PixelRect::new(1, 2, 300, 400));
        assert_eq!(rect, PixelRect::new(10, 20, 300, 400));
    }

    #[test]
    fn test_missing_files_give_default_regions() {
        let dir = tempdir().unwrap();
        let regions = HudRegions::load(&dir.path().join("a.txt"), &dir.path().join("b.txt"));
        assert_eq!(regions, HudRegions::default());
    }

    #[test]
    fn test_load_health_file_with_score_keys() {
        let dir = tempdir().unwrap();
        let health = dir.path().join("health.txt");
        fs::write(&health, "score_x1=125\nscore_y1=150\nscore_x2=160\nscore_y2=175\n").unwrap();

        let regions = HudRegions::load(&health, &dir.path().join("missing.txt"));
        assert_eq!(regions.health, PixelRect::new(125, 150, 160, 175));
        assert_eq!(regions.score, HudRegions::DEFAULT_SCORE);
    }

    #[test]
    fn test_clamp_to() {
        let rect = PixelRect::new(10, 10, 50, 30);
        assert_eq!(rect.clamp_to(100, 100), Some((10, 10, 40, 20)));
        // Partially outside: clipped like a slice
        assert_eq!(rect.clamp_to(20, 100), Some((10, 10, 10, 20)));
        // Entirely outside
        assert_eq!(rect.clamp_to(5, 5), None);
        // Inverted rectangle is empty
        assert_eq!(PixelRect::new(50, 10, 10, 30).clamp_to(100, 100), None);
    }
}
