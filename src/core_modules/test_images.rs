//! Synthetic bitmaps shared by the unit tests.

use image::{Rgba, RgbaImage};

/// Red grows left to right, green top to bottom, blue follows their mean.
/// No two quarter turns of it look alike.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    let fx = |x: u32| f64::from(x) / f64::from(width.max(2) - 1);
    let fy = |y: u32| f64::from(y) / f64::from(height.max(2) - 1);
    RgbaImage::from_fn(width, height, |x, y| {
        let r = fx(x) * 255.0;
        let g = fy(y) * 255.0;
        Rgba([r as u8, g as u8, ((r + g) / 2.0) as u8, 255])
    })
}

pub fn uniform(width: u32, height: u32, [r, g, b]: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
}
