// Software drawing onto a transparent ARGB framebuffer.
// Visual effects provided here:
// 1) A full clear (every pixel replaced, nothing blended).
// 2) Filled discs and stroked rings with soft (anti-aliased) edges.
// Everything is blended "source over" so a translucent ring shows what is under it.

use crate::types::{Color, FrameBuffer, Paint, PaintStyle};

/// Replace every pixel with `color` (no blending).
/// Visual: the previous frame disappears; with TRANSPARENT the surface shows through.
pub fn clear(fb: &mut FrameBuffer, color: Color) {
    fb.pixels.fill(color.0);
}

/// Source-over blend `color`, scaled by `coverage` in [0,1], into the pixel at (x,y).
/// Out-of-bounds writes are ignored.
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }

    let sa = (color.a() as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }

    let idx = y * fb.width + x;
    let dst = Color(fb.pixels[idx]);
    let da = dst.a() as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        fb.pixels[idx] = 0;
        return;
    }

    let mix = |s: u8, d: u8| -> u8 {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };

    fb.pixels[idx] = Color::from_argb(
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        mix(color.r(), dst.r()),
        mix(color.g(), dst.g()),
        mix(color.b(), dst.b()),
    )
    .0;
}

/// Visit every pixel of the square that may be touched by a circle of `reach` around (cx,cy).
/// The closure receives the pixel and the distance from its center to (cx,cy).
fn scan_circle_bounds(
    fb: &mut FrameBuffer,
    cx: f32,
    cy: f32,
    reach: f32,
    mut f: impl FnMut(&mut FrameBuffer, i32, i32, f32),
) {
    let x0 = ((cx - reach).floor() as i32).max(0);
    let y0 = ((cy - reach).floor() as i32).max(0);
    let x1 = ((cx + reach).ceil() as i32).min(fb.width as i32 - 1);
    let y1 = ((cy + reach).ceil() as i32).min(fb.height as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            f(fb, x, y, d);
        }
    }
}

/// Draw a filled disc centered at (cx,cy).
/// Visual: a solid round dot; the outermost pixel ring is partially transparent (smooth edge).
pub fn fill_circle(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, color: Color) {
    if radius <= 0.0 {
        return;
    }
    scan_circle_bounds(fb, cx, cy, radius + 1.0, |fb, x, y, d| {
        let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_pixel(fb, x, y, color, coverage);
        }
    });
}

/// Draw a ring of `width` pixels centered on `radius`.
/// Visual: an outline circle; the inside stays untouched.
pub fn stroke_circle(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, width: f32, color: Color) {
    if radius <= 0.0 || width <= 0.0 {
        return;
    }
    let half = width * 0.5;
    scan_circle_bounds(fb, cx, cy, radius + half + 1.0, |fb, x, y, d| {
        let coverage = (half + 0.5 - (d - radius).abs()).clamp(0.0, 1.0);
        if coverage > 0.0 {
            blend_pixel(fb, x, y, color, coverage);
        }
    });
}

/// Draw a circle the way `paint` says (filled or outlined).
pub fn draw_circle(fb: &mut FrameBuffer, cx: f32, cy: f32, radius: f32, paint: &Paint) {
    match paint.style {
        PaintStyle::Fill => fill_circle(fb, cx, cy, radius, paint.color),
        PaintStyle::Stroke => stroke_circle(fb, cx, cy, radius, paint.stroke_width, paint.color),
    }
}
