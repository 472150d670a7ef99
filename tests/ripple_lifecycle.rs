// Threaded behaviour of the ripple state machine, observed through a surface
// that records which threads lock it.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use water_ripple::surface::PixelCanvas;
use water_ripple::{Color, Error, PixelSurface, Result, RippleConfig, Surface, SurfaceCallback, WaterRipple};

/// Wraps a `PixelSurface` and remembers every draw-thread that locked it.
#[derive(Default)]
struct TracingSurface {
    inner: PixelSurface,
    draw_threads: Mutex<HashSet<ThreadId>>,
}

impl TracingSurface {
    fn draw_thread_count(&self) -> usize {
        self.draw_threads.lock().len()
    }
}

impl Surface for TracingSurface {
    type Canvas<'a> = PixelCanvas<'a>;

    fn lock_canvas(&self) -> Result<PixelCanvas<'_>> {
        let current = thread::current();
        if current.name() == Some(water_ripple::ripple::WORKER_THREAD_NAME) {
            self.draw_threads.lock().insert(current.id());
        }
        self.inner.lock_canvas()
    }

    fn add_callback(&self, callback: Weak<dyn SurfaceCallback>) {
        self.inner.add_callback(callback);
    }
}

/// Fails the draw thread's `fail_at`-th lock once, then behaves normally.
struct FlakySurface {
    inner: PixelSurface,
    worker_locks: AtomicUsize,
    fail_at: usize,
}

impl Surface for FlakySurface {
    type Canvas<'a> = PixelCanvas<'a>;

    fn lock_canvas(&self) -> Result<PixelCanvas<'_>> {
        if thread::current().name() == Some(water_ripple::ripple::WORKER_THREAD_NAME) {
            let n = self.worker_locks.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_at {
                return Err(Error::surface_lost("buffer queue abandoned"));
            }
        }
        self.inner.lock_canvas()
    }

    fn add_callback(&self, callback: Weak<dyn SurfaceCallback>) {
        self.inner.add_callback(callback);
    }
}

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

fn config(frame_interval_ms: u64) -> RippleConfig {
    RippleConfig {
        ripple_color: Color::BLUE,
        stop_color: Color::GREEN,
        frame_interval_ms,
        ..RippleConfig::default()
    }
}

fn setup(frame_interval_ms: u64) -> (Arc<TracingSurface>, Arc<WaterRipple<TracingSurface>>) {
    let surface = Arc::new(TracingSurface::default());
    let ripple = WaterRipple::new(Arc::clone(&surface), config(frame_interval_ms));
    surface.inner.create(200, 200);
    (surface, ripple)
}

#[test]
fn double_start_runs_one_draw_thread() {
    let (surface, ripple) = setup(5);
    ripple.start();
    ripple.start();
    assert!(ripple.is_running());

    let before = surface.inner.frames_posted();
    thread::sleep(Duration::from_millis(200));
    let frames = surface.inner.frames_posted() - before;
    ripple.stop();

    assert_eq!(surface.draw_thread_count(), 1);
    // One loop sleeping 5 ms between frames cannot exceed ~40 frames in 200 ms.
    assert!(frames > 0);
    assert!(frames <= 45, "{frames} frames in 200ms");
}

#[test]
fn rapid_start_stop_never_overlaps() {
    let (surface, ripple) = setup(0);
    for _ in 0..50 {
        ripple.start();
        ripple.stop();
        assert!(!ripple.is_running());
        assert_eq!(ripple.current_radius(), 0.0);
    }
    // After the last stop the surface shows only the idle center circle.
    let front = surface.inner.snapshot().unwrap();
    assert_eq!(front.pixel(100, 100), Some(Color::GREEN));
    assert_eq!(front.pixel(100, 185), Some(Color::TRANSPARENT));
}

#[test]
fn toggle_twice_from_idle_is_running_once_from_running_stops() {
    let (surface, ripple) = setup(1);
    ripple.toggle();
    assert!(ripple.is_running());
    ripple.toggle();
    assert!(!ripple.is_running());
    assert_eq!(ripple.current_radius(), 0.0);
    ripple.toggle();
    assert!(ripple.is_running());
    assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > 0.0));
    ripple.toggle();
    assert!(!ripple.is_running());
    assert_eq!(ripple.current_radius(), 0.0);
    assert!(surface.draw_thread_count() >= 1);
}

#[test]
fn pause_then_start_resumes_from_same_radius() {
    let (_surface, ripple) = setup(1);
    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > 82.0));
    ripple.pause();
    thread::sleep(Duration::from_millis(30));
    let paused_at = ripple.current_radius();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(ripple.current_radius(), paused_at);

    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() != paused_at));
    // The sweep continued instead of starting over at the center circle.
    assert!(ripple.current_radius() > 80.0);
    ripple.stop();
}

#[test]
fn destroyed_surface_ends_the_run() {
    let (surface, ripple) = setup(1);
    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || surface.inner.frames_posted() > 3));
    surface.inner.destroy();
    assert!(wait_until(Duration::from_secs(2), || !ripple.is_running()));

    // Stopping afterwards is harmless even though there is nothing to draw on.
    ripple.stop();
    assert_eq!(ripple.current_radius(), 0.0);
}

#[test]
fn recreated_surface_draws_idle_again() {
    let (surface, ripple) = setup(1);
    surface.inner.destroy();
    surface.inner.create(200, 200);
    let front = surface.inner.snapshot().unwrap();
    assert_eq!(front.pixel(100, 100), Some(Color::GREEN));
    assert!(!ripple.is_running());
}

#[test]
fn running_frames_use_wave_color_for_center() {
    let (surface, ripple) = setup(1);
    let idle_frames = surface.inner.frames_posted();
    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || surface.inner.frames_posted() > idle_frames + 3));
    assert!(ripple.is_running());
    assert_eq!(surface.inner.snapshot().unwrap().pixel(100, 100), Some(Color::BLUE));

    ripple.stop();
    assert_eq!(surface.inner.snapshot().unwrap().pixel(100, 100), Some(Color::GREEN));
}

#[test]
fn zero_ring_config_still_animates() {
    let surface = Arc::new(TracingSurface::default());
    let ripple = WaterRipple::new(
        Arc::clone(&surface),
        RippleConfig { ripple_count: 0, ..config(1) },
    );
    surface.inner.create(200, 200);
    assert_eq!(ripple.config().ripple_count, 1);

    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > 85.0));
    assert!(ripple.is_running());
    ripple.stop();
}

#[test]
fn failed_frame_leaves_the_idle_frame_behind() {
    let surface = Arc::new(FlakySurface {
        inner: PixelSurface::default(),
        worker_locks: AtomicUsize::new(0),
        fail_at: 5,
    });
    let ripple = WaterRipple::new(Arc::clone(&surface), config(1));
    surface.inner.create(200, 200);

    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || !ripple.is_running()));
    let radius = ripple.current_radius();
    assert!(radius >= 80.0, "four frames were drawn before the failure");
    // The draw thread repainted the idle frame on its way out.
    assert!(wait_until(Duration::from_secs(2), || {
        surface.inner.snapshot().and_then(|f| f.pixel(100, 100)) == Some(Color::GREEN)
    }));
    assert_eq!(ripple.current_radius(), radius);

    // The surface recovered, so a new run animates again.
    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || ripple.current_radius() > radius + 1.0));
    assert!(ripple.is_running());
    ripple.stop();
    assert_eq!(surface.inner.snapshot().unwrap().pixel(100, 100), Some(Color::GREEN));
}

#[test]
fn style_changes_reach_a_running_animation() {
    let (surface, ripple) = setup(1);
    ripple.start();
    assert!(wait_until(Duration::from_secs(2), || {
        surface.inner.snapshot().and_then(|f| f.pixel(100, 100)) == Some(Color::BLUE)
    }));

    ripple.set_color(Color::WHITE);
    ripple.set_stroke(true);
    assert!(wait_until(Duration::from_secs(2), || {
        surface.inner.snapshot().and_then(|f| f.pixel(100, 100)) == Some(Color::WHITE)
    }));
    assert!(ripple.is_running());
    assert!(ripple.is_stroke());
    assert_eq!(ripple.color(), Color::WHITE);

    // Idle frames keep the stop color regardless of the wave color.
    ripple.stop();
    assert_eq!(surface.inner.snapshot().unwrap().pixel(100, 100), Some(Color::GREEN));
}

#[test]
fn huge_ring_count_keeps_running_past_the_edge() {
    let surface = Arc::new(TracingSurface::default());
    let ripple = WaterRipple::new(
        Arc::clone(&surface),
        RippleConfig { ripple_count: 100_000_000, ..config(0) },
    );
    surface.inner.create(400, 400);

    ripple.start();
    // 160 -> 200 takes ~67 frames; run well past several wraps.
    assert!(wait_until(Duration::from_secs(5), || surface.inner.frames_posted() > 400));
    assert!(ripple.is_running());
    let radius = ripple.current_radius();
    assert!((160.0..=201.0).contains(&radius), "radius {radius}");

    ripple.stop();
    assert!(!ripple.is_running());
    ripple.start();
    assert!(ripple.is_running());
    ripple.stop();
}
