// What you SEE:
// • A red center circle on a checkerboard (the checkerboard is "behind" the transparent surface).
// • Click (or Space) toggles the ripple: rings grow out of the circle and fade near the edge.
// • P pauses (rings freeze, center turns to the stop color), S stops, R resets.
// • T switches filled/outlined rings, C cycles the wave color. ESC quits.
// • Switching to another window pauses, like a host app going to the background.

mod window;

use clap::Parser;
use minifb::Key;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use water_ripple::{Color, Error, FrameBuffer, PixelSurface, RippleConfig, WaterRipple};
use window::{Drawer, checkerboard, composite_over, draw_text_5x7};

const PALETTE: [Color; 4] = [
    Color::RED,
    Color(0xFF21_96F3),
    Color(0xFF4C_AF50),
    Color(0xFFFF_9800),
];

#[derive(Parser, Debug)]
#[command(name = "water-ripple", version, about = "Water ripple animation demo")]
struct Cli {
    /// Window width and height in pixels.
    #[arg(long, default_value_t = 360)]
    size: usize,

    /// TOML file with ripple settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Outline rings instead of filled discs.
    #[arg(long)]
    stroke: bool,

    /// Wave color (#RRGGBB or #AARRGGBB).
    #[arg(long)]
    color: Option<Color>,

    /// Save the last presented surface frame as PNG on exit.
    #[arg(long)]
    dump_frame: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => RippleConfig::load(path)?,
        None => RippleConfig::default(),
    };
    if cli.stroke {
        config.stroke = true;
    }
    if let Some(color) = cli.color {
        config.ripple_color = color;
    }

    /* --- Surface + ripple + window ---
       Visual: window opens with the idle center circle once the surface exists. */
    let size = cli.size.max(16);
    let surface = PixelSurface::new();
    let ripple = WaterRipple::new(surface.clone(), config);
    let mut drawer = Drawer::new("Water Ripple", size, size)?;
    ripple.on_measure(size as u32);
    surface.create(size, size);

    let backdrop = checkerboard(size, size, 16);
    let mut screen = FrameBuffer::new(size, size);
    let mut palette_idx = PALETTE.iter().position(|c| *c == ripple.color()).unwrap_or(0);
    let mut was_active = true;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut surface_frames_at_last = surface.frames_posted();
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Inputs */
        if drawer.clicked_once() || drawer.pressed_once(Key::Space) {
            ripple.toggle();
        }
        if drawer.pressed_once(Key::P) {
            ripple.pause();
        }
        if drawer.pressed_once(Key::S) {
            ripple.stop();
        }
        if drawer.pressed_once(Key::R) {
            ripple.reset();
        }
        if drawer.pressed_once(Key::T) {
            ripple.set_stroke(!ripple.is_stroke());
        }
        if drawer.pressed_once(Key::C) {
            palette_idx = (palette_idx + 1) % PALETTE.len();
            ripple.set_color(PALETTE[palette_idx]);
        }

        /* 2) Losing focus pauses the animation. */
        let active = drawer.is_active();
        if was_active && !active {
            ripple.pause();
        }
        was_active = active;

        /* 3) Composite the last presented surface frame over the backdrop. */
        surface.with_front(|front| composite_over(front, &backdrop, &mut screen));

        let status = if ripple.is_running() {
            "RUNNING"
        } else if ripple.current_radius() > 0.0 {
            "PAUSED"
        } else {
            "IDLE"
        };
        let mode = if ripple.is_stroke() { "STROKE" } else { "FILL" };
        let hud = format!("{status} | {mode} | {hud_fps_text}");
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_FF_FF_FF);

        /* 4) Present to the window. */
        drawer.present(&screen)?;

        /* 5) FPS of the ripple surface, once per second. */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let posted = surface.frames_posted();
            let surface_fps = (posted - surface_frames_at_last) as f32 / secs;
            let window_fps = frames_this_second as f32 / secs;
            tracing::info!(surface_fps, window_fps, radius = ripple.current_radius(), "fps");
            hud_fps_text = format!("FPS: {surface_fps:.1}");
            surface_frames_at_last = posted;
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    if let Some(path) = &cli.dump_frame {
        if let Some(frame) = surface.snapshot() {
            frame.save_png(path)?;
            tracing::info!(path = %path.display(), "saved frame");
        }
    }
    ripple.stop();
    surface.destroy();
    Ok(())
}
