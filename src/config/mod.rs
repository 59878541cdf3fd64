//! Configuration for the tools.
//!
//! Two layers: `config.json` next to the executable for general settings,
//! and the `key=value` coords files that hold the HUD regions.

pub mod coords;
pub mod settings;

pub use coords::{HudRegions, PixelRect, load_coords, region_from_coords};
pub use settings::{ToolConfig, load_config};
