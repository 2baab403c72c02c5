use alloc::{vec, vec::Vec};
use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
    Pixel,
};

/// Persistent off-screen raster every frame is composited onto.
///
/// Prior content is attenuated with [`fade`](Self::fade) rather than cleared,
/// which is what produces the trailing-persistence look: past frames decay
/// smoothly toward the background instead of flickering out. The canvas is
/// the sole accumulation target; nothing draws to the visible surface except
/// [`present`](Self::present).
pub struct FadeCanvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl FadeCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb888::BLACK; (size.width * size.height) as usize],
        }
    }

    /// Multiplies every channel by `strength / 255`, attenuating prior frames
    /// toward the black background without erasing them.
    pub fn fade(&mut self, strength: u8) {
        for px in self.pixels.iter_mut() {
            *px = Rgb888::new(
                scale(px.r(), strength),
                scale(px.g(), strength),
                scale(px.b(), strength),
            );
        }
    }

    /// Blends a translucent full-surface wash over the current content.
    pub fn wash(&mut self, color: Rgb888, alpha: u8) {
        let a = alpha as u16;
        let inv = 255 - a;
        for px in self.pixels.iter_mut() {
            *px = Rgb888::new(
                mix(px.r(), color.r(), a, inv),
                mix(px.g(), color.g(), a, inv),
                mix(px.b(), color.b(), a, inv),
            );
        }
    }

    /// Copies the raster to the output surface in one contiguous fill.
    pub fn present<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let area = Rectangle::new(Point::zero(), self.size);
        target.fill_contiguous(&area, self.pixels.iter().copied())
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(self.pixels[(y * self.size.width + x) as usize])
    }
}

fn scale(channel: u8, strength: u8) -> u8 {
    ((channel as u16 * strength as u16) / 255) as u8
}

fn mix(dst: u8, src: u8, alpha: u16, inv: u16) -> u8 {
    ((dst as u16 * inv + src as u16 * alpha) / 255) as u8
}

impl OriginDimensions for FadeCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FadeCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        // Off-surface pixels are dropped; callers never clamp geometry.
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                let (x, y) = (point.x as u32, point.y as u32);
                if x < self.size.width && y < self.size.height {
                    self.pixels[(y * self.size.width + x) as usize] = color;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_canvas() -> FadeCanvas {
        let mut canvas = FadeCanvas::new(Size::new(8, 8));
        canvas.draw_iter([Pixel(Point::new(3, 3), Rgb888::WHITE)]).unwrap();
        canvas
    }

    #[test]
    fn fade_attenuates_monotonically() {
        let mut canvas = lit_canvas();
        let mut last = 255u8;
        for _ in 0..40 {
            canvas.fade(238);
            let now = canvas.pixel(Point::new(3, 3)).unwrap().r();
            assert!(now <= last);
            last = now;
        }
        // Eventually reaches the background, never below it.
        for _ in 0..200 {
            canvas.fade(238);
        }
        assert_eq!(canvas.pixel(Point::new(3, 3)).unwrap(), Rgb888::BLACK);
    }

    #[test]
    fn wash_blends_toward_color() {
        let mut canvas = FadeCanvas::new(Size::new(4, 4));
        canvas.wash(Rgb888::WHITE, 122);
        assert_eq!(canvas.pixel(Point::zero()).unwrap(), Rgb888::new(122, 122, 122));
    }

    #[test]
    fn present_copies_the_raster() {
        let canvas = lit_canvas();
        let mut surface = FadeCanvas::new(Size::new(8, 8));
        canvas.present(&mut surface).unwrap();
        assert_eq!(surface.pixel(Point::new(3, 3)).unwrap(), Rgb888::WHITE);
        assert_eq!(surface.pixel(Point::new(0, 0)).unwrap(), Rgb888::BLACK);
    }

    #[test]
    fn out_of_bounds_draws_are_dropped() {
        let mut canvas = FadeCanvas::new(Size::new(8, 8));
        canvas
            .draw_iter([
                Pixel(Point::new(-1, 0), Rgb888::WHITE),
                Pixel(Point::new(0, -500), Rgb888::WHITE),
                Pixel(Point::new(8, 8), Rgb888::WHITE),
            ])
            .unwrap();
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(canvas.pixel(Point::new(x, y)).unwrap(), Rgb888::BLACK);
            }
        }
    }
}
