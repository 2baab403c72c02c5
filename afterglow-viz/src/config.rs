use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

use crate::color::LinePalette;
use crate::geometry::Orientation;

/// Tunables for one visualizer instance. Defaults reproduce the classic
/// capture-rate visualizer look: 16-byte stride, near-opaque fade, white
/// flash wash at roughly half opacity.
#[derive(Clone, Debug)]
pub struct VisualizerConfig {
    /// Stride between real/imaginary byte pairs in the spectral capture.
    pub divisions: usize,
    /// Edge the spectrum bars grow from.
    pub orientation: Orientation,
    /// Per-band line coloring.
    pub palette: LinePalette,
    /// Fade multiplier numerator out of 255. 255 never decays, 0 hard-clears.
    pub fade_strength: u8,
    /// Full-surface wash color for the explicit flash trigger.
    pub flash_color: Rgb888,
    /// Wash opacity out of 255.
    pub flash_alpha: u8,
    /// Energy rise over the previous frame that flags a band as rising.
    pub rise_threshold: f32,
    /// Markers per row in the wrapped rise-marker grid.
    pub marker_row_width: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            divisions: 16,
            orientation: Orientation::Top,
            palette: LinePalette::Wheel,
            fade_strength: 238,
            flash_color: Rgb888::WHITE,
            flash_alpha: 122,
            rise_threshold: 3.0,
            marker_row_width: 6,
        }
    }
}
