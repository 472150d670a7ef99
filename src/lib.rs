//! Looping "water ripple" animation drawn on a transparent surface by a
//! background thread.
//!
//! A [`WaterRipple`] owns the start/pause/stop/reset state machine and the
//! draw thread. It draws through the [`Surface`] / [`Canvas`] contract; a
//! software [`PixelSurface`] is included for hosts that composite CPU pixel
//! buffers (and for tests).
//!
//! ```no_run
//! use water_ripple::{PixelSurface, RippleConfig, WaterRipple};
//!
//! let surface = PixelSurface::new();
//! let ripple = WaterRipple::new(surface.clone(), RippleConfig::default());
//! surface.create(300, 300); // measures the area and draws the idle center circle
//! ripple.start();
//! // ... composite `surface.snapshot()` on every display refresh ...
//! ripple.stop();
//! ```

pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod render;
pub mod ripple;
pub mod surface;
pub mod types;

pub use config::RippleConfig;
pub use error::{Error, Result};
pub use geometry::RippleGeometry;
pub use ripple::{RenderState, WaterRipple};
pub use surface::{Canvas, PixelSurface, Surface, SurfaceCallback};
pub use types::{Color, FrameBuffer, Paint, PaintStyle};
