// THEORY:
// The icon builder turns a decoded bitmap into an `Icon`. It is a fixed pipeline
// of cheap numeric transforms, each one throwing away detail the comparison does
// not need:
//
// 1.  **Resample**: nearest-neighbor onto a (2S+1)·K square grid. The cost of
//     everything after this point is independent of the source size.
// 2.  **Block Average**: every K×K block collapses into one RGB triple, giving a
//     (2S+1)² intermediate grid that approximates the mean color of each region.
// 3.  **Box Blur + Downsample**: every final pixel averages the 3×3 neighborhood
//     of intermediate cells around (2·xd+1, 2·yd+1). The blur runs on averaged
//     RGB, and only its result is converted to luma/chroma, once per final pixel.
//     The thresholds were calibrated against exactly this order.
// 4.  **Normalize** (optional): stretch each channel to the full range. `icon`
//     applies it, `icon_nn` leaves it to the caller.
//
// YCbCr is used instead of RGB because brightness and color differences then
// land in separate channels that can be judged with separate tolerances.

use crate::core_modules::calibration::Calibration;
use crate::core_modules::icon::Icon;
use crate::core_modules::resampler::resampler::resize_by_nearest;
use crate::error::SignatureError;
use image::{GenericImageView, Rgba, RgbaImage};
use tracing::debug;

const ONE_NINTH: f64 = 1.0 / 9.0;

/// Full-precision RGB to YCbCr (JPEG/JFIF coefficients), all in [0, 255].
pub fn y_cb_cr([r, g, b]: [f64; 3]) -> [f64; 3] {
    let y = 0.299000 * r + 0.587000 * g + 0.114000 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.500000 * b;
    let cr = 128.0 + 0.500000 * r - 0.418688 * g - 0.081312 * b;
    [y, cb, cr]
}

impl Calibration {
    /// Generates a normalized icon. This is the signature to store and compare.
    pub fn icon<I>(&self, img: &I) -> Result<Icon, SignatureError>
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        let mut icon = self.icon_nn(img)?;
        icon.normalize();
        Ok(icon)
    }

    /// Generates a non-normalized icon. Useful for experiments and for callers
    /// that want to apply their own contrast treatment.
    pub fn icon_nn<I>(&self, img: &I) -> Result<Icon, SignatureError>
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        self.validate()?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(SignatureError::EmptyImage { width, height });
        }

        let resized_size = self.resized_size() as u32;
        let (resampled, original_size) = resize_by_nearest(img, resized_size, resized_size);
        let large_icon = self.block_average(&resampled);

        let mut icon = self.box_blur(&large_icon);
        icon.original_size = original_size;

        debug!(
            width = original_size.width,
            height = original_size.height,
            side = icon.side,
            "generated icon"
        );
        Ok(icon)
    }

    /// Averages K×K blocks of the resampled grid. Channels stay RGB.
    fn block_average(&self, resampled: &RgbaImage) -> Icon {
        let large_size = self.large_icon_size();
        let samples = self.samples;
        let inv_sample_pixels = 1.0 / (samples * samples) as f64;

        let mut large_icon = Icon::with_side(large_size);
        for x in 0..large_size {
            for y in 0..large_size {
                let mut sum = [0u32; 3];
                for m in 0..samples {
                    for n in 0..samples {
                        let Rgba([r, g, b, _]) =
                            *resampled.get_pixel((x * samples + m) as u32, (y * samples + n) as u32);
                        sum[0] += u32::from(r);
                        sum[1] += u32::from(g);
                        sum[2] += u32::from(b);
                    }
                }
                large_icon.set(x, y, sum.map(|s| f64::from(s) * inv_sample_pixels));
            }
        }
        large_icon
    }

    /// 3×3 box blur with stride 2, converting each result to YCbCr.
    fn box_blur(&self, large_icon: &Icon) -> Icon {
        let large_size = large_icon.side;
        let mut icon = Icon::with_side(self.icon_size);

        for x in (1..large_size - 1).step_by(2) {
            let xd = x / 2;
            for y in (1..large_size - 1).step_by(2) {
                let yd = y / 2;
                let mut sum = [0.0f64; 3];
                for nx in x - 1..=x + 1 {
                    for ny in y - 1..=y + 1 {
                        let c = large_icon.get(nx, ny);
                        sum[0] += c[0];
                        sum[1] += c[1];
                        sum[2] += c[2];
                    }
                }
                icon.set(xd, yd, y_cb_cr(sum.map(|s| s * ONE_NINTH)));
            }
        }
        icon
    }
}

/// Normalized icon with the standard calibration.
pub fn icon<I>(img: &I) -> Result<Icon, SignatureError>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    Calibration::STANDARD.icon(img)
}

/// Non-normalized icon with the standard calibration.
pub fn icon_nn<I>(img: &I) -> Result<Icon, SignatureError>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    Calibration::STANDARD.icon_nn(img)
}
