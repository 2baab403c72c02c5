use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    image::{Image, ImageDrawable},
    pixelcolor::Rgb888,
    prelude::*,
};

/// Left inset applied to every marker column.
const MARKER_INSET: i32 = 5;

/// One-shot flash trigger plus per-band rise markers.
pub struct FlashOverlay {
    flash_pending: bool,
}

impl FlashOverlay {
    pub const fn new() -> Self {
        Self {
            flash_pending: false,
        }
    }

    /// Arms the flash wash for the next render pass. Redundant triggers
    /// before the pass consumes the flag are idempotent.
    pub fn trigger(&mut self) {
        self.flash_pending = true;
    }

    /// Consumes the pending flash, at most once per trigger.
    pub fn take_flash(&mut self) -> bool {
        core::mem::replace(&mut self.flash_pending, false)
    }

    /// Bands whose energy rose above the previous frame's by more than
    /// `threshold`. Each frame is compared against the immediately preceding
    /// one only; there is no debouncing beyond that single-sample hysteresis.
    pub fn rising_bands<'a>(
        magnitudes: &'a [f32],
        previous: &'a [f32],
        threshold: f32,
    ) -> impl Iterator<Item = usize> + 'a {
        magnitudes
            .iter()
            .zip(previous)
            .enumerate()
            .filter_map(move |(i, (mag, prev))| (*mag > *prev + threshold).then_some(i))
    }

    /// Stamps the decoration sprite once per rising band, wrapped into a grid
    /// of `row_width` cells per row.
    pub fn draw_markers<D, M>(
        target: &mut D,
        marker: &M,
        magnitudes: &[f32],
        previous: &[f32],
        threshold: f32,
        row_width: usize,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
        M: ImageDrawable<Color = Rgb888>,
    {
        let row_width = row_width.max(1);
        let cell = marker.size();
        for band in Self::rising_bands(magnitudes, previous, threshold) {
            let col = (band % row_width) as i32;
            let row = (band / row_width) as i32;
            let origin = Point::new(
                col * cell.width as i32 + MARKER_INSET,
                row * cell.height as i32,
            );
            Image::new(marker, origin).draw(target)?;
        }
        Ok(())
    }
}
