// Frame renderer: turns the current wave radius into draw calls on a canvas.
// Visual outcomes:
// - A running frame: faded rings stepping inward from the wave front, center circle on top.
// - An idle frame: transparent surface with only the center circle.

use crate::error::{Error, Result};
use crate::geometry::RippleGeometry;
use crate::surface::{Canvas, Surface};
use crate::types::{Color, Paint};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation flag shared between a draw thread and whoever stops it.
/// Checked between draw calls, so a frame can be abandoned halfway.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}

/// Everything one running frame needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleFrame {
    pub geometry: RippleGeometry,
    pub current_radius: f32,
    /// Ring color, style and width. The color's alpha is replaced per ring.
    pub ring_paint: Paint,
    pub center_color: Color,
}

impl RippleFrame {
    /// Clear, draw every visible ring (outermost first), then the center circle.
    pub fn draw<C: Canvas>(&self, canvas: &mut C, cancel: &CancelToken) -> Result<()> {
        canvas.clear(Color::TRANSPARENT);

        let g = &self.geometry;
        let (cx, cy) = (g.center_x as f32, g.center_y as f32);
        for ring in g.rings(self.current_radius) {
            cancel.check()?;
            let paint = Paint {
                color: self.ring_paint.color.with_alpha(ring.alpha),
                ..self.ring_paint
            };
            canvas.draw_circle(cx, cy, ring.radius, &paint);
        }

        cancel.check()?;
        draw_center(canvas, g, self.center_color);
        Ok(())
    }
}

/// Clear to transparent and draw only the center circle.
pub fn draw_idle<C: Canvas>(canvas: &mut C, geometry: &RippleGeometry, center_color: Color) {
    canvas.clear(Color::TRANSPARENT);
    draw_center(canvas, geometry, center_color);
}

fn draw_center<C: Canvas>(canvas: &mut C, g: &RippleGeometry, color: Color) {
    canvas.draw_circle(
        g.center_x as f32,
        g.center_y as f32,
        g.center_radius as f32,
        &Paint::fill(color),
    );
}

/// Lock, draw and present one running frame.
/// If cancelled halfway the canvas is dropped unposted, which releases the surface.
pub fn render_ripple_frame<S: Surface>(surface: &S, frame: &RippleFrame, cancel: &CancelToken) -> Result<()> {
    cancel.check()?;
    let mut canvas = surface.lock_canvas()?;
    frame.draw(&mut canvas, cancel)?;
    cancel.check()?;
    canvas.post()
}

/// Lock, draw and present an idle frame.
pub fn render_idle_frame<S: Surface>(surface: &S, geometry: &RippleGeometry, center_color: Color) -> Result<()> {
    let mut canvas = surface.lock_canvas()?;
    draw_idle(&mut canvas, geometry, center_color);
    canvas.post()
}
