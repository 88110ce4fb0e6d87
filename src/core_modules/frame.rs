// THEORY:
// The signature core never parses file formats. It reads any decoded bitmap
// through the `image` crate's `GenericImageView` with 8-bit RGBA pixels, which
// covers `DynamicImage` (any bit depth, converted on access), `RgbaImage` and
// views. Video and capture code usually holds a packed RGBA frame buffer
// instead; `frame_view` lends such a buffer to the same interface without a copy.

use crate::error::SignatureError;
use image::{ImageBuffer, Rgba};

const CHANNELS: usize = 4;

/// A borrowed, packed RGBA8 frame viewed as an image.
pub type FrameView<'a> = ImageBuffer<Rgba<u8>, &'a [u8]>;

/// Wraps a raw RGBA8 frame buffer (row-major, 4 bytes per pixel).
pub fn frame_view(width: u32, height: u32, frame_buffer: &[u8]) -> Result<FrameView<'_>, SignatureError> {
    let expected = width as usize * height as usize * CHANNELS;
    if frame_buffer.len() != expected {
        return Err(SignatureError::FrameSize {
            width,
            height,
            expected,
            actual: frame_buffer.len(),
        });
    }
    ImageBuffer::from_raw(width, height, frame_buffer).ok_or(SignatureError::FrameSize {
        width,
        height,
        expected,
        actual: frame_buffer.len(),
    })
}
