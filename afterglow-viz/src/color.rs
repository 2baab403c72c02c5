use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

/// Per-band line coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinePalette {
    Solid(Rgb888),
    Wheel,
}

pub fn band_color(palette: LinePalette, index: usize, count: usize) -> Rgb888 {
    match palette {
        LinePalette::Solid(color) => color,
        LinePalette::Wheel => {
            let pos = ((index as u32 * 255 / count.max(1) as u32) % 255) as u8;
            wheel_color(pos)
        }
    }
}

fn wheel_color(pos: u8) -> Rgb888 {
    let pos = pos % 255;
    if pos < 85 {
        Rgb888::new(
            pos.saturating_mul(3),
            255u8.saturating_sub(pos.saturating_mul(3)),
            0,
        )
    } else if pos < 170 {
        let pos = pos - 85;
        Rgb888::new(
            255u8.saturating_sub(pos.saturating_mul(3)),
            0,
            pos.saturating_mul(3),
        )
    } else {
        let pos = pos - 170;
        Rgb888::new(
            0,
            pos.saturating_mul(3),
            255u8.saturating_sub(pos.saturating_mul(3)),
        )
    }
}
