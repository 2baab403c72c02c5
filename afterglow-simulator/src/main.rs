use embedded_graphics::{image::ImageRaw, pixelcolor::Rgb888, prelude::*};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use afterglow_link::{AudioSource, CaptureFeed, VisualizerEngine};
use afterglow_viz::{LinePalette, Orientation, VisualizerConfig};
use log::{debug, warn};

// Visualization parameters
pub const WIDTH: u32 = 256;
pub const HEIGHT: u32 = 200;
pub const FRAME_DELAY_MS: u64 = 16;

// Capture cadence: half of a typical maximum capture rate
const CAPTURE_PERIOD_MS: u64 = 40;
const DIVISIONS: usize = 2;
const BANDS: usize = 32;

const MARKER_SIZE: u32 = 8;
const FLASH_EVERY_FRAMES: u32 = 180;
const ORIENTATION_EVERY_FRAMES: u32 = 450;

/// Stand-in for the playback collaborator that owns the audio session.
struct SimulatedPlayback {
    session: u32,
}

impl AudioSource for SimulatedPlayback {
    fn audio_session(&self) -> Option<u32> {
        Some(self.session)
    }
}

/// Synthesizes one spectral capture: interleaved signed real/imaginary byte
/// pairs with a slow sweep so some bands keep rising past the threshold.
fn synth_spectral(t: f32) -> Vec<u8> {
    let mut buf = vec![0u8; BANDS * DIVISIONS];
    for band in 0..BANDS {
        let phase = t + band as f32 * 0.4;
        let envelope = (phase.sin() * 0.5 + 0.5) * (1.0 - band as f32 / BANDS as f32);
        let re = (envelope * 90.0) as i8;
        let im = ((phase * 1.7).cos() * envelope * 40.0) as i8;
        buf[DIVISIONS * band] = re as u8;
        buf[DIVISIONS * band + 1] = im as u8;
    }
    buf
}

fn synth_waveform(t: f32) -> Vec<u8> {
    (0..128)
        .map(|i| ((t + i as f32 * 0.1).sin() * 100.0) as i8 as u8)
        .collect()
}

/// Capture thread: plays the role of the audio pipeline, submitting buffers
/// at its own fixed rate regardless of how fast we render.
fn run_capture(mut feed: CaptureFeed, running: Arc<AtomicBool>) {
    let mut t = 0.0f32;
    while running.load(Ordering::Acquire) {
        feed.submit_spectral(synth_spectral(t));
        if (t * 10.0) as u32 % 5 == 0 {
            feed.submit_waveform(synth_waveform(t));
        }
        t += 0.1;
        thread::sleep(Duration::from_millis(CAPTURE_PERIOD_MS));
    }
}

/// Builds the decoration sprite: a small diamond, supplied to the engine the
/// way a real embedder would hand over a decoded asset.
fn build_marker() -> Vec<u8> {
    let mut data = vec![0u8; (MARKER_SIZE * MARKER_SIZE * 3) as usize];
    let half = MARKER_SIZE as i32 / 2;
    for y in 0..MARKER_SIZE as i32 {
        for x in 0..MARKER_SIZE as i32 {
            if (x - half).abs() + (y - half).abs() <= half {
                let idx = ((y as u32 * MARKER_SIZE + x as u32) * 3) as usize;
                data[idx] = 0xFF;
                data[idx + 1] = 0xD7;
            }
        }
    }
    data
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut display: SimulatorDisplay<Rgb888> =
        SimulatorDisplay::new(Size::new(WIDTH, HEIGHT));
    let mut window = Window::new(
        "Afterglow Simulator",
        &OutputSettingsBuilder::new().build(),
    );

    let config = VisualizerConfig {
        divisions: DIVISIONS,
        palette: LinePalette::Wheel,
        ..VisualizerConfig::default()
    };
    let playback = SimulatedPlayback { session: 1 };
    let (mut engine, feed) = VisualizerEngine::attach(&playback, config)?;

    let marker_data = build_marker();
    let marker = ImageRaw::<Rgb888>::new(&marker_data, MARKER_SIZE);

    let running = Arc::new(AtomicBool::new(true));
    let capture = {
        let running = Arc::clone(&running);
        thread::spawn(move || run_capture(feed, running))
    };

    let mut frame: u32 = 0;
    let mut orientation = Orientation::Top;
    'ui: loop {
        if engine.take_redraw() {
            engine.render_with_marker(&mut display, Some(&marker))?;
        }
        window.update(&display);

        frame = frame.wrapping_add(1);
        if frame % FLASH_EVERY_FRAMES == 0 {
            engine.flash();
        }
        if frame % ORIENTATION_EVERY_FRAMES == 0 {
            orientation = match orientation {
                Orientation::Top => Orientation::Bottom,
                Orientation::Bottom => Orientation::Top,
            };
            engine.set_orientation(orientation);
        }
        if frame % 60 == 0 {
            if let Some(waveform) = engine.latest_waveform() {
                debug!("latest waveform capture: {} samples", waveform.len());
            }
        }

        for event in window.events() {
            if let SimulatorEvent::Quit = event {
                break 'ui;
            }
        }
        thread::sleep(Duration::from_millis(FRAME_DELAY_MS));
    }

    running.store(false, Ordering::Release);
    engine.release();
    if capture.join().is_err() {
        warn!("capture thread panicked during shutdown");
    }
    Ok(())
}
