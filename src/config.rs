//! Ripple settings: colors, outline mode, ring count and pacing.
//!
//! Settings are fixed when a [`WaterRipple`](crate::ripple::WaterRipple) is built.
//! Only the wave color and the stroke flag can change afterwards.

use crate::error::{Error, Result};
use crate::types::Color;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RIPPLE_COUNT: u32 = 3;
pub const DEFAULT_STROKE_WIDTH: f32 = 3.0;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RippleConfig {
    /// Ring color while the animation runs (also the center circle color while running).
    pub ripple_color: Color,
    /// Center circle color while idle.
    pub stop_color: Color,
    /// Draw rings as outlines instead of filled discs.
    pub stroke: bool,
    /// Number of concentric rings. Values below 1 are treated as 1.
    pub ripple_count: u32,
    /// Outline width in pixels when `stroke` is on.
    pub stroke_width: f32,
    /// Delay between frames. 0 lets the loop run as fast as the surface presents.
    pub frame_interval_ms: u64,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            ripple_color: Color::RED,
            stop_color: Color::RED,
            stroke: false,
            ripple_count: DEFAULT_RIPPLE_COUNT,
            stroke_width: DEFAULT_STROKE_WIDTH,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl RippleConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: RippleConfig = toml::from_str(s).map_err(|e| Error::config(e.to_string()))?;
        Ok(cfg.normalized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Clamp values the renderer cannot work with.
    pub fn normalized(mut self) -> Self {
        if self.ripple_count == 0 {
            tracing::warn!("ripple_count = 0 is not drawable, using 1");
            self.ripple_count = 1;
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            self.stroke_width = DEFAULT_STROKE_WIDTH;
        }
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_red_filled_three_rings() {
        let cfg = RippleConfig::default();
        assert_eq!(cfg.ripple_color, Color::RED);
        assert_eq!(cfg.stop_color, Color::RED);
        assert!(!cfg.stroke);
        assert_eq!(cfg.ripple_count, 3);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = RippleConfig::from_toml_str(
            r##"
            ripple_color = "#3366FF"
            stroke = true
            "##,
        )
        .unwrap();
        assert_eq!(cfg.ripple_color, Color(0xFF33_66FF));
        assert_eq!(cfg.stop_color, Color::RED);
        assert!(cfg.stroke);
        assert_eq!(cfg.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn zero_rings_become_one() {
        let cfg = RippleConfig::from_toml_str("ripple_count = 0").unwrap();
        assert_eq!(cfg.ripple_count, 1);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(RippleConfig::from_toml_str(r##"stop_color = "#12""##).is_err());
        assert!(RippleConfig::from_toml_str("speed = 2").is_err());
    }
}
