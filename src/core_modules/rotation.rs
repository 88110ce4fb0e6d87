// THEORY:
// Users rotate photos by quarter turns far more often than by any other angle.
// `rotate90` turns an icon a quarter turn clockwise so the similarity engine can
// test both orientations without touching the source images again. Stored values
// are moved as-is, so four turns reproduce the original icon bit for bit.

pub mod rotation {
    use crate::core_modules::icon::{Icon, ImageSize};

    /// Returns a copy of `icon` rotated 90° clockwise, with width and height swapped.
    pub fn rotate90(icon: &Icon) -> Icon {
        let side = icon.side;
        let mut rotated = Icon::with_side(side);
        for channel in 0..3 {
            for y in 0..side {
                for x in 0..side {
                    let from = icon.index(y, side - 1 - x, channel);
                    let to = rotated.index(x, y, channel);
                    rotated.pixels[to] = icon.pixels[from];
                }
            }
        }
        rotated.original_size = ImageSize::new(icon.original_size.height, icon.original_size.width);
        rotated
    }
}
