// THEORY:
// The `Icon` is the unit exchanged between generation and comparison: a tiny,
// square, three-channel image plus the size of the picture it came from. Like
// `Pixel` and `Chunk` elsewhere in the engine it is a "dumb" data container. It
// knows its own layout and how to encode and decode values, but nothing about
// how it was produced or what it is similar to.
//
// Layout:
// - `pixels` holds 3·S² unsigned 16-bit values, channel-major. Channel 0 (luma)
//   comes first, then chroma-b, then chroma-r. Each channel plane is row-major.
// - A value is a fixed-point number: the color value in [0, 255] multiplied by
//   `FIXED_POINT_SCALE` (255) and truncated. Normalized channels span [0, 255²].
// - `original_size` is only ever used for the proportion metric.
//
// An icon without pixel storage is the "no signature" sentinel. It exists so
// callers can carry failed decodes around; it must never reach a metric.

use crate::core_modules::calibration::{FIXED_POINT_SCALE, NORMALIZED_MAX};
use crate::error::SignatureError;
use image::{Rgba, RgbaImage};
use tracing::debug;

const ONE_255TH: f64 = 1.0 / FIXED_POINT_SCALE;

/// Width and height of a source image before any resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// The three color channels of an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Luma,
    ChromaB,
    ChromaR,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Luma, Channel::ChromaB, Channel::ChromaR];

    pub fn index(self) -> usize {
        match self {
            Channel::Luma => 0,
            Channel::ChromaB => 1,
            Channel::ChromaR => 2,
        }
    }
}

/// A fixed-size perceptual signature of one image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Icon {
    pub(crate) side: usize,
    pub(crate) pixels: Vec<u16>,
    pub(crate) original_size: ImageSize,
}

impl Icon {
    /// The "no signature" sentinel, for carrying failures without an `Option`.
    pub fn empty() -> Self {
        Self {
            side: 0,
            pixels: Vec::new(),
            original_size: ImageSize::default(),
        }
    }

    /// A zeroed icon of the given side.
    pub(crate) fn with_side(side: usize) -> Self {
        Self {
            side,
            pixels: vec![0; side * side * 3],
            original_size: ImageSize::default(),
        }
    }

    /// Rebuilds an icon from stored parts, e.g. a database row.
    pub fn from_parts(side: usize, pixels: Vec<u16>, original_size: ImageSize) -> Result<Self, SignatureError> {
        if original_size.width == 0 || original_size.height == 0 {
            return Err(SignatureError::EmptyImage {
                width: original_size.width,
                height: original_size.height,
            });
        }
        let expected = side * side * 3;
        if pixels.len() != expected {
            return Err(SignatureError::InvalidLayout {
                side,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            side,
            pixels,
            original_size,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn original_size(&self) -> ImageSize {
        self.original_size
    }

    /// The S² values of one channel plane.
    pub fn channel(&self, channel: Channel) -> &[u16] {
        let plane = self.side * self.side;
        let start = channel.index() * plane;
        &self.pixels[start..start + plane]
    }

    #[inline]
    pub(crate) fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        self.side * (channel * self.side + y) + x
    }

    /// Decoded values of the three channels at (x, y).
    pub fn get(&self, x: usize, y: usize) -> [f64; 3] {
        [0, 1, 2].map(|channel| f64::from(self.pixels[self.index(x, y, channel)]) * ONE_255TH)
    }

    /// Encodes three channel values at (x, y). The conversion truncates.
    pub fn set(&mut self, x: usize, y: usize, values: [f64; 3]) {
        for (channel, value) in values.into_iter().enumerate() {
            let index = self.index(x, y, channel);
            self.pixels[index] = (value * FIXED_POINT_SCALE) as u16;
        }
    }

    /// Stretches every channel so its minimum maps to 0 and its maximum to 255².
    ///
    /// A uniform channel has nothing to stretch and is left untouched. Applying
    /// this twice gives the same result as applying it once.
    pub fn normalize(&mut self) {
        let plane = self.side * self.side;
        if plane == 0 {
            return;
        }
        for (channel, values) in self.pixels.chunks_exact_mut(plane).enumerate() {
            let (min, max) = values
                .iter()
                .fold((u16::MAX, u16::MIN), |(min, max), &v| (min.min(v), max.max(v)));
            if max == min {
                debug!(channel, value = min, "uniform channel, skipping normalization");
                continue;
            }
            let range = u32::from(max - min);
            for value in values.iter_mut() {
                *value = (u32::from(*value - min) * NORMALIZED_MAX / range) as u16;
            }
        }
    }

    /// Renders the three channel planes as the R, G and B of a small image.
    /// Meant for eyeballing what an icon retained, not for display.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let side = self.side as u32;
        RgbaImage::from_fn(side, side, |x, y| {
            let [c1, c2, c3] = self.get(x as usize, y as usize);
            Rgba([to_byte(c1), to_byte(c2), to_byte(c3), 255])
        })
    }
}

fn to_byte(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}
