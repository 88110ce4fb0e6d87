// THEORY:
// The resampler is the first, crudest stage of icon generation. It maps a source
// bitmap of any size onto a fixed working grid by nearest-neighbor sampling: no
// interpolation, just picking the source pixel at `floor(x * scale)`. The result
// aliases fine detail, and the icon builder averages that away right afterwards.
// What matters here is that the cost is fixed by the target size, not by the
// source size.
//
// It also reports the source dimensions, since the icon keeps them for the
// proportion metric.

pub mod resampler {
    use crate::core_modules::icon::ImageSize;
    use image::{GenericImageView, Rgba, RgbaImage};

    /// Resizes `src` to `dst_width` x `dst_height` with nearest-neighbor sampling
    /// and returns the source size alongside.
    ///
    /// Both the source and the target must have non-zero area.
    pub fn resize_by_nearest<I>(src: &I, dst_width: u32, dst_height: u32) -> (RgbaImage, ImageSize)
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        assert!(dst_width > 0 && dst_height > 0, "resample target must have non-zero area");
        let (src_width, src_height) = src.dimensions();
        assert!(src_width > 0 && src_height > 0, "resample source must have non-zero area");

        let x_scale = f64::from(src_width) / f64::from(dst_width);
        let y_scale = f64::from(src_height) / f64::from(dst_height);

        let mut dst = RgbaImage::new(dst_width, dst_height);
        for y in 0..dst_height {
            let src_y = ((f64::from(y) * y_scale) as u32).min(src_height - 1);
            for x in 0..dst_width {
                let src_x = ((f64::from(x) * x_scale) as u32).min(src_width - 1);
                dst.put_pixel(x, y, src.get_pixel(src_x, src_y));
            }
        }

        (dst, ImageSize::new(src_width, src_height))
    }
}

#[cfg(test)]
mod tests {
    use super::resampler::*;
    use image::{Rgba, RgbaImage};

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, (x * 10 + y) as u8, 255]))
    }

    #[test]
    fn upsampling_repeats_source_pixels() {
        let src = checker(2, 2);
        let (dst, size) = resize_by_nearest(&src, 4, 4);
        assert_eq!(size.width, 2);
        assert_eq!(size.height, 2);
        assert_eq!(dst.get_pixel(0, 0), src.get_pixel(0, 0));
        assert_eq!(dst.get_pixel(1, 1), src.get_pixel(0, 0));
        assert_eq!(dst.get_pixel(2, 1), src.get_pixel(1, 0));
        assert_eq!(dst.get_pixel(3, 3), src.get_pixel(1, 1));
    }

    #[test]
    fn downsampling_picks_floor_positions() {
        let src = checker(6, 4);
        let (dst, size) = resize_by_nearest(&src, 3, 2);
        assert_eq!((size.width, size.height), (6, 4));
        assert_eq!(dst.dimensions(), (3, 2));
        // scale is 2 on both axes
        assert_eq!(dst.get_pixel(1, 1), src.get_pixel(2, 2));
        assert_eq!(dst.get_pixel(2, 0), src.get_pixel(4, 0));
    }

    #[test]
    fn odd_scales_stay_in_bounds() {
        let src = checker(533, 400);
        let (dst, size) = resize_by_nearest(&src, 276, 276);
        assert_eq!(dst.dimensions(), (276, 276));
        assert_eq!((size.width, size.height), (533, 400));
    }

    #[test]
    #[should_panic]
    fn zero_target_is_rejected() {
        let src = checker(4, 4);
        let _ = resize_by_nearest(&src, 0, 4);
    }
}
