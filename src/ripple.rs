//! The water ripple component: start/pause/stop/reset state machine plus the
//! draw thread that runs the [frame renderer](crate::render).
//!
//! ```text
//!            start()                      pause()
//!   Idle ───────────────▶ Running ───────────────▶ Paused (radius kept)
//!    ▲                      │  │                        │
//!    │       stop()/reset() │  │ surface lost           │ start()
//!    └──────────────────────┘  └──▶ Idle (radius kept)  └──▶ Running
//! ```
//!
//! One draw thread exists per run. It talks to the caller only through the
//! running flag and the shared [`RenderState`]. `stop()` and `reset()` cancel
//! and join that thread before touching the surface themselves, so the
//! surface is never drawn from two threads at once.

use crate::config::RippleConfig;
use crate::error::{Error, Result};
use crate::geometry::RippleGeometry;
use crate::render::{CancelToken, RippleFrame, render_idle_frame, render_ripple_frame};
use crate::surface::{Surface, SurfaceCallback};
use crate::types::{Color, Paint};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

pub const WORKER_THREAD_NAME: &str = "water-ripple";

/// Mutable animation state shared with the draw thread.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderState {
    /// Wave front radius. 0 means "not started": the next spread jumps to the center circle.
    pub current_radius: f32,
    /// Set by [`WaterRipple::on_measure`].
    pub geometry: Option<RippleGeometry>,
}

/// The parts of the settings that may change at any time.
#[derive(Clone, Copy, Debug)]
struct RippleStyle {
    wave_color: Color,
    stroke: bool,
}

struct Shared {
    running: AtomicBool,
    state: Mutex<RenderState>,
    style: RwLock<RippleStyle>,
    config: RippleConfig,
}

impl Shared {
    fn ring_paint(&self) -> Paint {
        let style = *self.style.read();
        if style.stroke {
            Paint::stroke(style.wave_color, self.config.stroke_width)
        } else {
            Paint::fill(style.wave_color)
        }
    }

    /// Draw the current radius, present it, then advance the wave.
    fn draw_one_frame<S: Surface>(&self, surface: &S, cancel: &CancelToken) -> Result<()> {
        let (geometry, current_radius) = {
            let state = self.state.lock();
            let geometry = state
                .geometry
                .ok_or_else(|| Error::surface_unavailable("ripple area not measured"))?;
            (geometry, state.current_radius)
        };
        let ring_paint = self.ring_paint();
        let frame = RippleFrame {
            geometry,
            current_radius,
            ring_paint,
            center_color: ring_paint.color,
        };

        render_ripple_frame(surface, &frame, cancel)?;

        let mut state = self.state.lock();
        state.current_radius = geometry.spread(state.current_radius);
        Ok(())
    }

    fn paint_idle<S: Surface>(&self, surface: &S) -> Result<()> {
        let geometry = self.state.lock().geometry;
        match geometry {
            Some(g) => render_idle_frame(surface, &g, self.config.stop_color),
            None => {
                tracing::trace!("idle repaint skipped: not measured yet");
                Ok(())
            }
        }
    }
}

/// Why a draw loop ended.
#[derive(Debug)]
enum LoopExit {
    Paused,
    Cancelled,
    Failed(Error),
}

/// Clears the running flag when the draw loop ends, including by unwinding.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn run_loop<S: Surface>(surface: Arc<S>, shared: Arc<Shared>, cancel: CancelToken) {
    tracing::debug!("ripple draw loop started");
    let running = RunningGuard(&shared.running);
    let interval = shared.config.frame_interval();
    let mut frames: u64 = 0;

    let exit = loop {
        if !shared.running.load(Ordering::Acquire) {
            break LoopExit::Paused;
        }
        match shared.draw_one_frame(&*surface, &cancel) {
            Ok(()) => frames += 1,
            Err(Error::Cancelled) => break LoopExit::Cancelled,
            Err(e) => break LoopExit::Failed(e),
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    };

    drop(running);
    match exit {
        LoopExit::Paused => {
            if let Err(e) = shared.paint_idle(&*surface) {
                tracing::debug!(error = %e, "idle repaint after pause failed");
            }
        }
        LoopExit::Cancelled => {}
        LoopExit::Failed(ref e) => {
            tracing::debug!(error = %e, "surface failure ends the ripple run");
            if let Err(e) = shared.paint_idle(&*surface) {
                tracing::debug!(error = %e, "idle repaint after failure failed");
            }
        }
    }
    tracing::debug!(frames, ?exit, "ripple draw loop finished");
}

struct Worker {
    handle: JoinHandle<()>,
    cancel: CancelToken,
}

impl Worker {
    /// Cancel and wait. Never joins the calling thread itself.
    fn halt(self) {
        self.cancel.cancel();
        if self.handle.thread().id() == thread::current().id() {
            return;
        }
        if self.handle.join().is_err() {
            tracing::warn!("ripple draw thread panicked");
        }
    }
}

/// Concentric rings expanding from a center circle, drawn on `S` by a background thread.
pub struct WaterRipple<S: Surface + 'static> {
    surface: Arc<S>,
    shared: Arc<Shared>,
    /// The live (or finished but not yet joined) draw thread. Held across spawn and join
    /// so two runs can never overlap.
    worker: Mutex<Option<Worker>>,
}

impl<S: Surface + 'static> WaterRipple<S> {
    /// Build the component and register it for `surface` lifecycle events.
    pub fn new(surface: Arc<S>, config: RippleConfig) -> Arc<Self> {
        let config = config.normalized();
        let style = RippleStyle { wave_color: config.ripple_color, stroke: config.stroke };
        let ripple = Arc::new(Self {
            surface,
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                state: Mutex::new(RenderState::default()),
                style: RwLock::new(style),
                config,
            }),
            worker: Mutex::new(None),
        });
        let weak = Arc::downgrade(&ripple);
        let callback: Weak<dyn SurfaceCallback> = weak;
        ripple.surface.add_callback(callback);
        ripple
    }

    /// Measured width of the (square) ripple area.
    pub fn on_measure(&self, width: u32) {
        let geometry = RippleGeometry::from_width(width, self.shared.config.ripple_count);
        tracing::debug!(width, ?geometry, "ripple area measured");
        self.shared.state.lock().geometry = Some(geometry);
    }

    /// Start the animation. Does nothing while already running.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if self.shared.running.load(Ordering::Acquire) {
            return;
        }
        // A paused or failed run may still be finishing its last frame.
        if let Some(previous) = worker.take() {
            previous.halt();
        }

        self.shared.running.store(true, Ordering::Release);
        let cancel = CancelToken::new();
        let surface = Arc::clone(&self.surface);
        let shared = Arc::clone(&self.shared);
        let token = cancel.clone();
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_loop(surface, shared, token));

        match spawned {
            Ok(handle) => *worker = Some(Worker { handle, cancel }),
            Err(e) => {
                tracing::warn!(error = %e, "could not spawn ripple draw thread");
                self.shared.running.store(false, Ordering::Release);
            }
        }
    }

    /// Let the current frame finish, then repaint idle. The wave position is kept.
    pub fn pause(&self) {
        self.shared.running.store(false, Ordering::Release);
    }

    /// Cancel the draw thread and [`reset`](Self::reset).
    pub fn stop(&self) {
        tracing::debug!("ripple stop");
        self.reset();
    }

    /// Cancel any draw thread, forget the wave position and repaint only the center
    /// circle in the stop color. Runs on the calling thread.
    pub fn reset(&self) {
        self.halt_worker();
        self.shared.state.lock().current_radius = 0.0;
        if let Err(e) = self.shared.paint_idle(&*self.surface) {
            tracing::debug!(error = %e, "reset could not draw");
        }
    }

    pub fn toggle(&self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Wave color, applied from the next frame.
    pub fn set_color(&self, color: Color) {
        self.shared.style.write().wave_color = color;
    }

    pub fn color(&self) -> Color {
        self.shared.style.read().wave_color
    }

    /// Outline rings instead of filled discs, applied from the next frame.
    pub fn set_stroke(&self, stroke: bool) {
        self.shared.style.write().stroke = stroke;
    }

    pub fn is_stroke(&self) -> bool {
        self.shared.style.read().stroke
    }

    pub fn current_radius(&self) -> f32 {
        self.shared.state.lock().current_radius
    }

    pub fn geometry(&self) -> Option<RippleGeometry> {
        self.shared.state.lock().geometry
    }

    pub fn config(&self) -> &RippleConfig {
        &self.shared.config
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    fn halt_worker(&self) {
        let mut worker = self.worker.lock();
        self.shared.running.store(false, Ordering::Release);
        if let Some(w) = worker.take() {
            w.halt();
        }
    }
}

impl<S: Surface + 'static> SurfaceCallback for WaterRipple<S> {
    fn surface_created(&self, width: u32, height: u32) {
        tracing::debug!(width, height, "ripple surface created");
        if self.geometry().is_none() {
            self.on_measure(width);
        }
        self.reset();
    }

    fn surface_changed(&self, width: u32, height: u32) {
        tracing::trace!(width, height, "ripple surface changed");
    }

    fn surface_destroyed(&self) {
        tracing::trace!("ripple surface destroyed");
    }
}

impl<S: Surface + 'static> Drop for WaterRipple<S> {
    fn drop(&mut self) {
        self.halt_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelSurface;
    use std::time::{Duration, Instant};

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    fn config() -> RippleConfig {
        RippleConfig {
            ripple_color: Color::BLUE,
            stop_color: Color::GREEN,
            frame_interval_ms: 1,
            ..RippleConfig::default()
        }
    }

    fn ripple() -> (Arc<PixelSurface>, Arc<WaterRipple<PixelSurface>>) {
        let surface = PixelSurface::new();
        let ripple = WaterRipple::new(Arc::clone(&surface), config());
        surface.create(200, 200);
        (surface, ripple)
    }

    #[test]
    fn starts_idle() {
        let (_surface, ripple) = ripple();
        assert!(!ripple.is_running());
        assert_eq!(ripple.current_radius(), 0.0);
        assert_eq!(ripple.geometry().map(|g| g.center_radius), Some(80));
    }

    #[test]
    fn created_surface_shows_idle_center() {
        let (surface, _ripple) = ripple();
        assert_eq!(surface.frames_posted(), 1);
        let front = surface.snapshot().unwrap();
        assert_eq!(front.pixel(100, 100), Some(Color::GREEN));
        assert_eq!(front.pixel(100, 195), Some(Color::TRANSPARENT));
    }

    #[test]
    fn pause_keeps_radius_and_repaints_idle() {
        let (surface, ripple) = ripple();
        ripple.start();
        assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > 81.0));
        ripple.pause();
        assert!(!ripple.is_running());

        let posted = surface.frames_posted();
        assert!(wait_until(Duration::from_secs(2), || ripple.worker_finished()));
        assert!(surface.frames_posted() >= posted);
        assert!(ripple.current_radius() >= 80.0);
        assert_eq!(surface.snapshot().unwrap().pixel(100, 100), Some(Color::GREEN));
    }

    #[test]
    fn stop_clears_radius() {
        let (surface, ripple) = ripple();
        ripple.start();
        assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > 81.0));
        ripple.stop();
        assert!(!ripple.is_running());
        assert_eq!(ripple.current_radius(), 0.0);

        let front = surface.snapshot().unwrap();
        assert_eq!(front.pixel(100, 100), Some(Color::GREEN));
        assert_eq!(front.pixel(100, 100 + 85), Some(Color::TRANSPARENT));
    }

    #[test]
    fn style_setters() {
        let (_surface, ripple) = ripple();
        assert!(!ripple.is_stroke());
        ripple.set_stroke(true);
        assert!(ripple.is_stroke());
        ripple.set_color(Color::WHITE);
        assert_eq!(ripple.color(), Color::WHITE);
        assert_eq!(ripple.shared.ring_paint().style, crate::types::PaintStyle::Stroke);
    }

    #[test]
    fn running_flag_clears_when_the_loop_unwinds() {
        let flag = AtomicBool::new(true);
        let unwound = std::panic::catch_unwind(|| {
            let _running = RunningGuard(&flag);
            panic!("draw failed");
        });
        assert!(unwound.is_err());
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn unmeasured_run_ends_itself() {
        let surface = PixelSurface::new();
        let ripple = WaterRipple::new(Arc::clone(&surface), config());
        ripple.start();
        assert!(wait_until(Duration::from_secs(2), || !ripple.is_running()));
    }

    impl<S: Surface + 'static> WaterRipple<S> {
        fn worker_finished(&self) -> bool {
            self.worker.lock().as_ref().is_none_or(|w| w.handle.is_finished())
        }
    }
}
