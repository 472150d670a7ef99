// Core types shared by the surface, the rasterizer and the draw thread.

use crate::error::{Error, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// A straight (non-premultiplied) 0xAARRGGBB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }
    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Same RGB, alpha replaced.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Color((self.0 & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#RRGGBB` (opaque) and `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let value = u32::from_str_radix(hex, 16)
            .map_err(|e| Error::config(format!("bad color {s:?}: {e}")))?;
        match hex.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(Error::config(format!(
                "bad color {s:?}: expected #RRGGBB or #AARRGGBB"
            ))),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Outline vs filled circles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintStyle {
    Fill,
    Stroke,
}

/// What a single draw call uses: color (alpha included), style and line width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub style: PaintStyle,
    pub stroke_width: f32,
}

impl Paint {
    pub fn fill(color: Color) -> Self {
        Self { color, style: PaintStyle::Fill, stroke_width: 0.0 }
    }

    pub fn stroke(color: Color, stroke_width: f32) -> Self {
        Self { color, style: PaintStyle::Stroke, stroke_width }
    }
}

/// A CPU pixel buffer. Each entry is 0xAARRGGBB; alpha 0 is fully transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    /// A fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color(self.pixels[y * self.width + x]))
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| (*p >> 24) != 0).count()
    }

    /// Convert to an `image` RGBA buffer (straight alpha).
    pub fn to_rgba_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = Color(self.pixels[y as usize * self.width + x as usize]);
            Rgba([c.r(), c.g(), c.b(), c.a()])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_rgba_image().save(path)?;
        Ok(())
    }
}
