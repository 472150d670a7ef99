//! Ripple geometry: where the rings are, how faded they are, and how far the
//! wave moves each frame.
//!
//! Everything here is pure arithmetic on the measured surface width so it can
//! be checked without a surface or a thread.

/// Radius gained per frame. This is the animation's timing contract.
pub const SPREAD_STEP: f32 = 0.6;
/// Center circle radius as a fraction of half the width.
pub const CENTER_RATIO: f64 = 0.8;
/// Brightest ring alpha is `255 * ALPHA_SCALE`.
pub const ALPHA_SCALE: f32 = 0.6;

/// One ring to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    pub radius: f32,
    pub alpha: u8,
}

/// Measured layout of a square ripple area.
///
/// The center sits at `(width / 2, width / 2)`; rings live between
/// `center_radius` and `max_radius`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RippleGeometry {
    pub center_x: i32,
    pub center_y: i32,
    pub center_radius: i32,
    pub max_radius: i32,
    pub ripple_count: i32,
}

impl RippleGeometry {
    pub fn from_width(width: u32, ripple_count: u32) -> Self {
        let half = (width / 2) as i32;
        let center_radius = (half as f64 * CENTER_RATIO) as i32;
        Self {
            center_x: half,
            center_y: half,
            center_radius,
            max_radius: half,
            ripple_count: i32::try_from(ripple_count.max(1)).unwrap_or(i32::MAX),
        }
    }

    /// Distance the rings travel, from the center circle's edge to the surface edge.
    #[inline]
    pub fn span(&self) -> i32 {
        self.max_radius - self.center_radius
    }

    /// Spacing between neighbouring rings (integer division, toward zero).
    #[inline]
    pub fn space_radius(&self) -> i32 {
        self.span() / self.count()
    }

    /// Ring count, never below 1 even for a hand-built geometry.
    #[inline]
    fn count(&self) -> i32 {
        self.ripple_count.max(1)
    }

    /// Index of the outermost full ring spacing covered by `current_radius`.
    ///
    /// `None` while the wave has not reached the center circle's edge yet
    /// (the first frame after a start). Capped at `ripple_count - 1`: the last
    /// step before wrapping may overshoot `max_radius` by less than one step.
    pub fn ripple_level(&self, current_radius: f32) -> Option<u32> {
        let space = self.space_radius();
        if space <= 0 || current_radius < self.center_radius as f32 {
            return None;
        }
        let level = ((current_radius - self.center_radius as f32) / space as f32).floor() as u32;
        Some(level.min(self.count() as u32 - 1))
    }

    /// Ring alpha: 153 at the center circle's edge, fading linearly to 0 at `max_radius`.
    /// Radii outside that band are clamped to it.
    pub fn alpha_by_radius(&self, radius: f32) -> u8 {
        let span = self.span();
        if span <= 0 {
            return 0;
        }
        let travelled = ((radius - self.center_radius as f32) / span as f32).clamp(0.0, 1.0);
        (255.0 * (1.0 - travelled) * ALPHA_SCALE).floor() as u8
    }

    /// Where the wave restarts after touching the edge: the second-to-outermost ring position.
    pub fn wrap_radius(&self) -> f32 {
        let count = i64::from(self.count());
        let offset = (count - 1) * i64::from(self.span()) / count;
        (i64::from(self.center_radius) + offset) as f32
    }

    /// Advance the wave by one frame.
    pub fn spread(&self, current_radius: f32) -> f32 {
        if current_radius == 0.0 {
            self.center_radius as f32
        } else if current_radius < self.max_radius as f32 {
            current_radius + SPREAD_STEP
        } else {
            self.wrap_radius()
        }
    }

    /// Rings for a frame at `current_radius`, outermost first.
    pub fn rings(&self, current_radius: f32) -> Vec<Ring> {
        let Some(level) = self.ripple_level(current_radius) else {
            return Vec::new();
        };
        let space = self.space_radius() as f32;
        (0..=level)
            .map(|i| {
                let radius = current_radius - space * i as f32;
                Ring { radius, alpha: self.alpha_by_radius(radius) }
            })
            .collect()
    }
}
