//! Drawable surface contract and a software implementation.
//!
//! A [`Surface`] hands out one [`Canvas`] at a time. The canvas is a scoped
//! lock: [`Canvas::post`] presents the frame and releases the surface, and
//! dropping a canvas without posting releases it without presenting. That is
//! what lets the draw thread abandon a frame halfway without leaving the
//! surface locked.
//!
//! Lifecycle observers ([`SurfaceCallback`]) are held weakly, so a renderer
//! that owns the surface can also observe it without a reference cycle.

use crate::draw;
use crate::error::{Error, Result};
use crate::types::{Color, FrameBuffer, Paint};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A locked frame being drawn.
pub trait Canvas {
    /// Replace every pixel with `color` (use [`Color::TRANSPARENT`] to wipe the frame).
    fn clear(&mut self, color: Color);

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint);

    /// Present the frame to the compositor and release the surface.
    fn post(self) -> Result<()>
    where
        Self: Sized;
}

/// Something the draw thread can lock, draw into, and present.
pub trait Surface: Send + Sync {
    type Canvas<'a>: Canvas
    where
        Self: 'a;

    /// Lock the surface for one frame. Fails when the surface does not exist.
    fn lock_canvas(&self) -> Result<Self::Canvas<'_>>;

    /// Register for created/changed/destroyed events. Dead observers are dropped silently.
    fn add_callback(&self, callback: Weak<dyn SurfaceCallback>);
}

/// Surface lifecycle events.
pub trait SurfaceCallback: Send + Sync {
    fn surface_created(&self, width: u32, height: u32);
    fn surface_changed(&self, width: u32, height: u32);
    fn surface_destroyed(&self);
}

/// Double-buffered, transparent ARGB surface living in memory.
///
/// The draw side writes into the back buffer under an exclusive lock; `post`
/// copies it to the front buffer that the compositor reads.
#[derive(Default)]
pub struct PixelSurface {
    back: Mutex<Option<FrameBuffer>>,
    front: Mutex<Option<FrameBuffer>>,
    callbacks: Mutex<Vec<Weak<dyn SurfaceCallback>>>,
    frames_posted: AtomicU64,
}

impl PixelSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Allocate transparent buffers and tell observers the surface exists.
    pub fn create(&self, width: usize, height: usize) {
        self.install(width, height);
        tracing::debug!(width, height, "surface created");
        for cb in self.live_callbacks() {
            cb.surface_created(width as u32, height as u32);
        }
    }

    /// Reallocate at a new size (contents are lost) and notify observers.
    pub fn resize(&self, width: usize, height: usize) {
        self.install(width, height);
        tracing::debug!(width, height, "surface changed");
        for cb in self.live_callbacks() {
            cb.surface_changed(width as u32, height as u32);
        }
    }

    /// Tear the surface down. Waits for an in-flight frame; later locks fail.
    pub fn destroy(&self) {
        {
            let mut back = self.back.lock();
            *back = None;
            *self.front.lock() = None;
        }
        tracing::debug!("surface destroyed");
        for cb in self.live_callbacks() {
            cb.surface_destroyed();
        }
    }

    pub fn is_created(&self) -> bool {
        self.front.lock().is_some()
    }

    /// How many frames have been presented since the surface was built.
    pub fn frames_posted(&self) -> u64 {
        self.frames_posted.load(Ordering::Acquire)
    }

    /// Copy of the last presented frame.
    pub fn snapshot(&self) -> Option<FrameBuffer> {
        self.front.lock().clone()
    }

    /// Borrow the last presented frame without copying it.
    pub fn with_front<R>(&self, f: impl FnOnce(&FrameBuffer) -> R) -> Option<R> {
        self.front.lock().as_ref().map(f)
    }

    fn install(&self, width: usize, height: usize) {
        let mut back = self.back.lock();
        *back = Some(FrameBuffer::new(width, height));
        *self.front.lock() = Some(FrameBuffer::new(width, height));
    }

    // Called without holding any buffer lock: observers usually draw straight away.
    fn live_callbacks(&self) -> Vec<Arc<dyn SurfaceCallback>> {
        let mut callbacks = self.callbacks.lock();
        callbacks.retain(|cb| cb.strong_count() > 0);
        callbacks.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Surface for PixelSurface {
    type Canvas<'a> = PixelCanvas<'a>;

    fn lock_canvas(&self) -> Result<PixelCanvas<'_>> {
        let guard = MutexGuard::try_map(self.back.lock(), |back| back.as_mut())
            .map_err(|_| Error::surface_unavailable("surface not created"))?;
        Ok(PixelCanvas { back: guard, surface: self })
    }

    fn add_callback(&self, callback: Weak<dyn SurfaceCallback>) {
        self.callbacks.lock().push(callback);
    }
}

/// Exclusive access to a [`PixelSurface`] back buffer for one frame.
pub struct PixelCanvas<'a> {
    back: MappedMutexGuard<'a, FrameBuffer>,
    surface: &'a PixelSurface,
}

impl PixelCanvas<'_> {
    pub fn buffer(&self) -> &FrameBuffer {
        &self.back
    }
}

impl Canvas for PixelCanvas<'_> {
    fn clear(&mut self, color: Color) {
        draw::clear(&mut self.back, color);
    }

    fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        draw::draw_circle(&mut self.back, cx, cy, radius, paint);
    }

    fn post(self) -> Result<()> {
        let mut front = self.surface.front.lock();
        let front = front
            .as_mut()
            .ok_or_else(|| Error::surface_lost("front buffer gone while posting"))?;
        front.pixels.copy_from_slice(&self.back.pixels);
        self.surface.frames_posted.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
