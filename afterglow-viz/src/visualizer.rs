use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    image::{ImageDrawable, ImageRaw},
    pixelcolor::Rgb888,
    prelude::*,
};

#[cfg(feature = "logging")]
use defmt::info;
#[cfg(feature = "logging")]
use defmt_rtt as _;

use crate::config::VisualizerConfig;
use crate::fade_canvas::FadeCanvas;
use crate::geometry::{Orientation, SegmentBuffer};
use crate::overlay::FlashOverlay;

/// Borrowed view of one processed spectral frame. All three slices have the
/// same length whenever they are non-empty.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub db: &'a [f32],
    pub magnitudes: &'a [f32],
    pub previous: &'a [f32],
}

/// Composites spectrum geometry and overlay events onto a persistent fading
/// canvas, then presents the canvas to the output surface.
///
/// The canvas is created lazily on the first pass for a given surface size
/// and recreated only when the surface size changes. Each pass runs in a
/// fixed order: fade the canvas, draw the new frame and overlay onto it,
/// present. Fading before drawing is what keeps fresh content at full
/// intensity for one frame while older frames decay behind it.
pub struct SpectrumVisualizer {
    config: VisualizerConfig,
    geometry: SegmentBuffer,
    overlay: FlashOverlay,
    canvas: Option<FadeCanvas>,
}

impl SpectrumVisualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            geometry: SegmentBuffer::new(),
            overlay: FlashOverlay::new(),
            canvas: None,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Toggled by the presentation collaborator; takes effect next pass.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.config.orientation = orientation;
    }

    /// Arms the one-shot flash wash for the next pass.
    pub fn trigger_flash(&mut self) {
        self.overlay.trigger();
    }

    /// The persistence canvas, once the first pass has created it.
    pub fn canvas(&self) -> Option<&FadeCanvas> {
        self.canvas.as_ref()
    }

    /// One render pass without a decoration sprite; rise markers are skipped
    /// and the rest of the pass completes.
    pub fn render<D>(
        &mut self,
        target: &mut D,
        frame: Option<FrameInput<'_>>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.render_with_marker::<D, ImageRaw<'static, Rgb888>>(target, frame, None)
    }

    /// One full render pass. A `None` frame means no capture has arrived yet:
    /// the canvas still fades and presents, so trails keep decaying.
    pub fn render_with_marker<D, M>(
        &mut self,
        target: &mut D,
        frame: Option<FrameInput<'_>>,
        marker: Option<&M>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
        M: ImageDrawable<Color = Rgb888>,
    {
        let size = target.bounding_box().size;
        let canvas = self.canvas.get_or_insert_with(|| {
            #[cfg(feature = "logging")]
            info!(
                "allocating {}x{} persistence canvas",
                size.width, size.height
            );
            FadeCanvas::new(size)
        });
        if canvas.size() != size {
            #[cfg(feature = "logging")]
            info!(
                "surface resized, recreating canvas at {}x{}",
                size.width, size.height
            );
            *canvas = FadeCanvas::new(size);
        }

        canvas.fade(self.config.fade_strength);

        if let Some(frame) = frame {
            self.geometry.rebuild(
                frame.db,
                self.config.divisions,
                self.config.orientation,
                size.height,
            );
            self.geometry
                .draw(canvas, self.config.palette)
                .map_err(absorb)?;
        }

        if self.overlay.take_flash() {
            canvas.wash(self.config.flash_color, self.config.flash_alpha);
        }

        if let (Some(frame), Some(marker)) = (frame, marker) {
            FlashOverlay::draw_markers(
                canvas,
                marker,
                frame.magnitudes,
                frame.previous,
                self.config.rise_threshold,
                self.config.marker_row_width,
            )
            .map_err(absorb)?;
        }

        canvas.present(target)
    }
}

/// Canvas drawing cannot fail; this converts its `Infallible` error into
/// whatever error type the output surface uses.
fn absorb<E>(never: Infallible) -> E {
    match never {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LinePalette;
    use embedded_graphics::geometry::{Point, Size};

    fn config() -> VisualizerConfig {
        VisualizerConfig {
            divisions: 2,
            palette: LinePalette::Solid(Rgb888::WHITE),
            ..VisualizerConfig::default()
        }
    }

    fn strong_frame() -> FrameInput<'static> {
        // db 30 -> segment height 50
        static DB: [f32; 1] = [30.0];
        static MAGS: [f32; 1] = [900.0];
        static PREV: [f32; 1] = [0.0];
        FrameInput {
            db: &DB,
            magnitudes: &MAGS,
            previous: &PREV,
        }
    }

    #[test]
    fn fresh_geometry_is_not_attenuated() {
        let mut surface = FadeCanvas::new(Size::new(64, 64));
        let mut viz = SpectrumVisualizer::new(config());
        viz.render(&mut surface, Some(strong_frame())).unwrap();

        // fade ran before the draw, so the new segment is at full intensity
        assert_eq!(surface.pixel(Point::new(0, 10)).unwrap(), Rgb888::WHITE);
    }

    #[test]
    fn trails_decay_monotonically_without_new_geometry() {
        let mut surface = FadeCanvas::new(Size::new(64, 64));
        let mut viz = SpectrumVisualizer::new(config());
        viz.render(&mut surface, Some(strong_frame())).unwrap();

        let mut last = 255u8;
        for _ in 0..10 {
            viz.render(&mut surface, None).unwrap();
            let now = surface.pixel(Point::new(0, 10)).unwrap().r();
            assert!(now < last);
            last = now;
        }
    }

    #[test]
    fn redundant_flash_triggers_wash_once() {
        let mut surface = FadeCanvas::new(Size::new(16, 16));
        let mut viz = SpectrumVisualizer::new(config());

        viz.trigger_flash();
        viz.trigger_flash();
        viz.render(&mut surface, None).unwrap();
        // single wash over black: each channel lands at the wash alpha
        assert_eq!(
            surface.pixel(Point::new(8, 8)).unwrap(),
            Rgb888::new(122, 122, 122)
        );

        // flag was cleared; the next pass only fades
        viz.render(&mut surface, None).unwrap();
        let faded = (122u16 * 238 / 255) as u8;
        assert_eq!(
            surface.pixel(Point::new(8, 8)).unwrap(),
            Rgb888::new(faded, faded, faded)
        );
    }

    #[test]
    fn canvas_is_recreated_on_surface_resize() {
        let mut viz = SpectrumVisualizer::new(config());

        let mut small = FadeCanvas::new(Size::new(32, 32));
        viz.render(&mut small, Some(strong_frame())).unwrap();
        assert_eq!(viz.canvas().unwrap().size(), Size::new(32, 32));

        let mut wide = FadeCanvas::new(Size::new(64, 32));
        viz.render(&mut wide, None).unwrap();
        assert_eq!(viz.canvas().unwrap().size(), Size::new(64, 32));
        // new size epoch starts from the background
        assert_eq!(wide.pixel(Point::new(0, 10)).unwrap(), Rgb888::BLACK);
    }

    #[test]
    fn missing_capture_renders_only_background() {
        let mut surface = FadeCanvas::new(Size::new(16, 16));
        let mut viz = SpectrumVisualizer::new(config());
        viz.render(&mut surface, None).unwrap();
        assert_eq!(surface.pixel(Point::new(0, 0)).unwrap(), Rgb888::BLACK);
    }

    #[test]
    fn missing_marker_skips_rise_markers_only() {
        let mut surface = FadeCanvas::new(Size::new(64, 64));
        let mut viz = SpectrumVisualizer::new(config());
        // rising band, but no sprite supplied
        viz.render(&mut surface, Some(strong_frame())).unwrap();

        // geometry still landed, marker cell stayed background
        assert_eq!(surface.pixel(Point::new(0, 10)).unwrap(), Rgb888::WHITE);
        assert_eq!(surface.pixel(Point::new(6, 1)).unwrap(), Rgb888::BLACK);
    }
}
