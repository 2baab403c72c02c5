use alloc::vec::Vec;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
};

use crate::color::{band_color, LinePalette};

/// Which edge of the surface the spectrum bars grow from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Top,
    Bottom,
}

/// Horizontal advance per band is `4 * divisions` pixels, keeping the spacing
/// fixed no matter how many bands the capture produced.
const X_STRIDE: usize = 4;
const DB_GAIN: f32 = 2.0;
const DB_OFFSET: f32 = 10.0;

/// Flat per-band line segments, 4 floats each (`x0, y0, x1, y1`), rebuilt
/// every frame and drawn in a single batched pass.
pub struct SegmentBuffer {
    points: Vec<f32>,
}

impl SegmentBuffer {
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Rebuilds one segment per band from the dB spectrum.
    ///
    /// Vertical extent is `db * 2 - 10` with no explicit clamp; values outside
    /// the surface simply fall off the drawable area. A floored dB value thus
    /// collapses the band to the anchoring edge.
    pub fn rebuild(
        &mut self,
        db: &[f32],
        divisions: usize,
        orientation: Orientation,
        surface_height: u32,
    ) {
        self.points.clear();
        self.points.reserve(db.len() * 4);
        for (i, &band_db) in db.iter().enumerate() {
            let x = (i * X_STRIDE * divisions) as f32;
            let height = band_db * DB_GAIN - DB_OFFSET;
            let (y0, y1) = match orientation {
                Orientation::Top => (0.0, height),
                Orientation::Bottom => {
                    (surface_height as f32, surface_height as f32 - height)
                }
            };
            self.points.extend_from_slice(&[x, y0, x, y1]);
        }
    }

    /// Segment endpoints, `4 * band_count` floats.
    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// Draws every segment in one pass over the point list.
    pub fn draw<D>(&self, target: &mut D, palette: LinePalette) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let count = self.points.len() / 4;
        for (i, seg) in self.points.chunks_exact(4).enumerate() {
            let color = band_color(palette, i, count);
            Line::new(
                Point::new(seg[0] as i32, seg[1] as i32),
                Point::new(seg[2] as i32, seg[3] as i32),
            )
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fade_canvas::FadeCanvas;
    use approx::assert_abs_diff_eq;
    use embedded_graphics::geometry::Size;

    const DB: [f32; 4] = [26.99, 16.99, -999.0, 29.54];

    #[test]
    fn x_offsets_follow_the_division_stride() {
        let mut segments = SegmentBuffer::new();
        segments.rebuild(&DB, 2, Orientation::Top, 200);

        let points = segments.points();
        assert_eq!(points.len(), 16);
        for (i, seg) in points.chunks_exact(4).enumerate() {
            assert_abs_diff_eq!(seg[0], (i * 8) as f32);
            assert_abs_diff_eq!(seg[2], seg[0]);
        }
    }

    #[test]
    fn vertical_extent_is_scaled_db() {
        let mut segments = SegmentBuffer::new();
        segments.rebuild(&[30.0], 2, Orientation::Top, 200);
        let points = segments.points();
        assert_abs_diff_eq!(points[1], 0.0);
        assert_abs_diff_eq!(points[3], 50.0);
    }

    #[test]
    fn top_and_bottom_mirror_about_the_midline() {
        let height = 200u32;
        let mut top = SegmentBuffer::new();
        let mut bottom = SegmentBuffer::new();
        top.rebuild(&DB, 2, Orientation::Top, height);
        bottom.rebuild(&DB, 2, Orientation::Bottom, height);

        for (t, b) in top.points().chunks_exact(4).zip(bottom.points().chunks_exact(4)) {
            assert_abs_diff_eq!(t[0], b[0]);
            assert_abs_diff_eq!(b[1], height as f32 - t[1]);
            assert_abs_diff_eq!(b[3], height as f32 - t[3]);
        }
    }

    #[test]
    fn segment_count_tracks_band_count() {
        let mut segments = SegmentBuffer::new();
        segments.rebuild(&[10.0; 7], 16, Orientation::Top, 100);
        assert_eq!(segments.points().len(), 28);
        segments.rebuild(&[10.0; 3], 16, Orientation::Top, 100);
        assert_eq!(segments.points().len(), 12);
    }

    #[test]
    fn draw_paints_the_segment_column() {
        let mut canvas = FadeCanvas::new(Size::new(100, 100));
        let mut segments = SegmentBuffer::new();
        segments.rebuild(&[30.0], 2, Orientation::Top, 100);
        segments
            .draw(&mut canvas, LinePalette::Solid(Rgb888::WHITE))
            .unwrap();

        assert_eq!(canvas.pixel(Point::new(0, 0)).unwrap(), Rgb888::WHITE);
        assert_eq!(canvas.pixel(Point::new(0, 50)).unwrap(), Rgb888::WHITE);
        assert_eq!(canvas.pixel(Point::new(0, 51)).unwrap(), Rgb888::BLACK);
        assert_eq!(canvas.pixel(Point::new(1, 10)).unwrap(), Rgb888::BLACK);
    }
}
