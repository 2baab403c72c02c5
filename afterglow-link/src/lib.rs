//! Bridges an audio capture context to the spectrum visualizer.
//!
//! Capture callbacks arrive on their own thread at a rate this crate does not
//! control, so buffer handoff goes through a wait-free triple buffer: the
//! capture side replaces the newest buffer wholesale, the render side always
//! reads a complete and consistent one, and neither side ever blocks the
//! other. A torn read is impossible by construction.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use afterglow_dsp::SpectralProcessor;
use afterglow_viz::{FrameInput, Orientation, SpectrumVisualizer, VisualizerConfig};
use embedded_graphics::{
    draw_target::DrawTarget,
    image::{ImageDrawable, ImageRaw},
    pixelcolor::Rgb888,
};
use log::{debug, info};
use thiserror::Error;
use triple_buffer::TripleBuffer;

/// Anything the engine can tap for capture data. Mirrors the player link: a
/// source without an active audio session cannot be attached to.
pub trait AudioSource {
    fn audio_session(&self) -> Option<u32>;
}

#[derive(Debug, Error)]
pub enum LinkError {
    /// The audio source had no active session to capture from.
    #[error("audio source has no active session to attach to")]
    InvalidSource,
}

/// Capture-side handle, meant to live on the capture context. Submissions
/// replace the newest buffer of that kind and request a redraw; requests
/// coalesce until the render side consumes them.
pub struct CaptureFeed {
    waveform: triple_buffer::Input<Vec<u8>>,
    spectral: triple_buffer::Input<Vec<u8>>,
    redraw: Arc<AtomicBool>,
}

impl CaptureFeed {
    /// Replaces the held waveform buffer. Content is not validated; an empty
    /// buffer is the legal "no data yet" state.
    pub fn submit_waveform(&mut self, bytes: Vec<u8>) {
        self.waveform.write(bytes);
        self.redraw.store(true, Ordering::Release);
    }

    /// Replaces the held spectral buffer (interleaved real/imaginary pairs).
    pub fn submit_spectral(&mut self, bytes: Vec<u8>) {
        self.spectral.write(bytes);
        self.redraw.store(true, Ordering::Release);
    }
}

/// Render-side engine: owns the processor, the visualizer and the consuming
/// ends of the capture handoff.
///
/// Detach is implicit: the capture collaborator simply stops submitting (or
/// drops its [`CaptureFeed`]). Submissions that arrive after the consumer
/// stops rendering are written but never read, which is benign.
pub struct VisualizerEngine {
    waveform: triple_buffer::Output<Vec<u8>>,
    spectral: triple_buffer::Output<Vec<u8>>,
    redraw: Arc<AtomicBool>,
    processor: SpectralProcessor,
    visualizer: SpectrumVisualizer,
    released: bool,
}

impl VisualizerEngine {
    /// Attaches to an audio source, returning the engine and the feed handle
    /// for the capture context. Fails fast if the source has no session; no
    /// partial engine state is left behind on failure.
    pub fn attach(
        source: &dyn AudioSource,
        config: VisualizerConfig,
    ) -> Result<(Self, CaptureFeed), LinkError> {
        let session = source.audio_session().ok_or(LinkError::InvalidSource)?;
        info!("visualizer attached to audio session {session}");

        let (waveform_in, waveform_out) = TripleBuffer::<Vec<u8>>::new(&Vec::new()).split();
        let (spectral_in, spectral_out) = TripleBuffer::<Vec<u8>>::new(&Vec::new()).split();
        let redraw = Arc::new(AtomicBool::new(false));

        let divisions = config.divisions;
        let engine = Self {
            waveform: waveform_out,
            spectral: spectral_out,
            redraw: Arc::clone(&redraw),
            processor: SpectralProcessor::new(divisions),
            visualizer: SpectrumVisualizer::new(config),
            released: false,
        };
        let feed = CaptureFeed {
            waveform: waveform_in,
            spectral: spectral_in,
            redraw,
        };
        Ok((engine, feed))
    }

    /// True when at least one submission arrived since the last call. Any
    /// number of submissions coalesce into a single pending redraw.
    pub fn take_redraw(&mut self) -> bool {
        !self.released && self.redraw.swap(false, Ordering::AcqRel)
    }

    /// Arms the one-shot flash wash for the next render pass.
    pub fn flash(&mut self) {
        self.visualizer.trigger_flash();
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.visualizer.set_orientation(orientation);
    }

    pub fn visualizer(&self) -> &SpectrumVisualizer {
        &self.visualizer
    }

    /// Newest waveform capture, if any has arrived. The spectrum pass never
    /// consumes this; it is kept for callers that want the raw samples.
    pub fn latest_waveform(&mut self) -> Option<&[u8]> {
        let bytes = self.waveform.read();
        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }

    /// One bounded, synchronous render pass over the newest capture data,
    /// without a decoration sprite.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.render_with_marker::<D, ImageRaw<'static, Rgb888>>(target, None)
    }

    /// One render pass, stamping `marker` on rising bands when supplied.
    pub fn render_with_marker<D, M>(
        &mut self,
        target: &mut D,
        marker: Option<&M>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
        M: ImageDrawable<Color = Rgb888>,
    {
        if self.released {
            return Ok(());
        }

        let spectral = self.spectral.read();
        let frame = if spectral.is_empty() {
            // no capture yet for this kind; the canvas still fades
            None
        } else {
            self.processor.process(spectral);
            Some(FrameInput {
                db: self.processor.db(),
                magnitudes: self.processor.magnitudes(),
                previous: self.processor.previous(),
            })
        };
        self.visualizer.render_with_marker(target, frame, marker)
    }

    /// Frees engine-held capture state. Safe to call more than once; after
    /// release, render passes and redraw requests are no-ops.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            debug!("visualizer capture resources released");
        }
    }
}
