// THEORY:
// The similarity engine answers one question: do two icons show the same picture?
// It looks through two independent "lenses" and both must agree:
//
// 1.  **Proportion**: each image's long side divided by its short side. Images
//     whose ratios differ by more than the threshold (5%) are never the same
//     picture, no matter how alike their content looks at 11×11.
// 2.  **Euclidean distance**: per channel, the sum of squared differences between
//     the two icons, measured in decoded [0, 255] units. No square root is taken;
//     the thresholds are squared instead. Luma is judged strictest. Chroma gets a
//     multiple of the luma tolerance, since color shifts from re-encoding are
//     common and perceptually minor.
//
// The default policy compares with strict inequalities against the calibrated
// thresholds. The custom policy scales every threshold by a caller coefficient
// and compares inclusively, so all-zero coefficients still let an icon match
// itself. Both policies share one metric computation and one verdict routine.
//
// Rotation-aware variants additionally try a single quarter turn of either icon.
// Turning `b` clockwise covers a source rotated 270°, turning `a` covers 90°.
// A half turn is deliberately not tried.

use crate::core_modules::calibration::{Calibration, CustomCoefficients, FIXED_POINT_SCALE};
use crate::core_modules::icon::{Icon, ImageSize};
use crate::core_modules::rotation::rotation::rotate90;
use tracing::trace;

const ONE_255TH_SQUARED: f64 = (1.0 / FIXED_POINT_SCALE) * (1.0 / FIXED_POINT_SCALE);

/// All four distances between two icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub proportion: f64,
    pub luma: f64,
    pub chroma_b: f64,
    pub chroma_r: f64,
}

/// How a metric is held against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Strict,
    Inclusive,
}

impl Bound {
    fn admits(self, metric: f64, threshold: f64) -> bool {
        match self {
            Bound::Strict => metric < threshold,
            Bound::Inclusive => metric <= threshold,
        }
    }
}

fn long_over_short(size: ImageSize) -> f64 {
    let (w, h) = (f64::from(size.width), f64::from(size.height));
    if w <= h { h / w } else { w / h }
}

/// Relative difference of the two images' long-side/short-side ratios.
/// 0 means identical proportions.
pub fn proportion_metric(a: &Icon, b: &Icon) -> f64 {
    let ratio_a = long_over_short(a.original_size);
    let ratio_b = long_over_short(b.original_size);
    if ratio_a > ratio_b {
        (ratio_a - ratio_b) / ratio_a
    } else {
        (ratio_b - ratio_a) / ratio_b
    }
}

/// Squared Euclidean distances for luma, chroma-b and chroma-r.
///
/// Both icons must carry pixels and share the same side.
pub fn euclidean_metric(a: &Icon, b: &Icon) -> [f64; 3] {
    debug_assert!(!a.is_empty() && !b.is_empty(), "euclidean metric on an empty icon");
    debug_assert_eq!(a.side, b.side, "euclidean metric on icons of different sides");

    let plane = a.side * a.side;
    let mut metrics = [0.0f64; 3];
    for (channel, metric) in metrics.iter_mut().enumerate() {
        let range = channel * plane..(channel + 1) * plane;
        for (&ca, &cb) in a.pixels[range.clone()].iter().zip(&b.pixels[range]) {
            let diff = f64::from(ca) - f64::from(cb);
            *metric += diff * ONE_255TH_SQUARED * diff;
        }
    }
    metrics
}

/// Proportion and Euclidean metrics together.
pub fn metrics(a: &Icon, b: &Icon) -> Metrics {
    let [luma, chroma_b, chroma_r] = euclidean_metric(a, b);
    Metrics {
        proportion: proportion_metric(a, b),
        luma,
        chroma_b,
        chroma_r,
    }
}

/// Icons can only be compared when both carry a signature of the same resolution.
pub fn comparable(a: &Icon, b: &Icon) -> bool {
    !a.is_empty() && !b.is_empty() && a.side == b.side
}

impl Calibration {
    fn judge(&self, a: &Icon, b: &Icon, coeff: &CustomCoefficients, bound: Bound) -> bool {
        if !comparable(a, b) {
            return false;
        }

        // Cheap check first.
        let proportion = proportion_metric(a, b);
        if !bound.admits(proportion, self.proportion_threshold * coeff.proportion) {
            trace!(proportion, "proportions differ");
            return false;
        }

        let [luma, chroma_b, chroma_r] = euclidean_metric(a, b);
        trace!(proportion, luma, chroma_b, chroma_r, "euclidean metrics");
        bound.admits(luma, self.luma_threshold() * coeff.luma)
            && bound.admits(chroma_b, self.chroma_threshold() * coeff.chroma_b)
            && bound.admits(chroma_r, self.chroma_threshold() * coeff.chroma_r)
    }

    /// Verdict with the calibrated thresholds.
    pub fn similar(&self, a: &Icon, b: &Icon) -> bool {
        self.judge(a, b, &CustomCoefficients::UNIT, Bound::Strict)
    }

    /// Verdict with every threshold scaled by its coefficient. Inclusive, so
    /// zero coefficients accept exact copies.
    pub fn custom_similar(&self, a: &Icon, b: &Icon, coeff: &CustomCoefficients) -> bool {
        self.judge(a, b, coeff, Bound::Inclusive)
    }

    /// Like `similar`, also accepting a quarter turn either way.
    pub fn similar_with_rotations(&self, a: &Icon, b: &Icon) -> bool {
        with_rotations(a, b, |a, b| self.similar(a, b))
    }

    /// Like `custom_similar`, also accepting a quarter turn either way.
    pub fn custom_similar_with_rotations(&self, a: &Icon, b: &Icon, coeff: &CustomCoefficients) -> bool {
        with_rotations(a, b, |a, b| self.custom_similar(a, b, coeff))
    }
}

fn with_rotations(a: &Icon, b: &Icon, judge: impl Fn(&Icon, &Icon) -> bool) -> bool {
    if judge(a, b) {
        return true;
    }
    if !comparable(a, b) {
        return false;
    }
    // b turned 90°.
    if judge(a, &rotate90(b)) {
        return true;
    }
    // As if b was turned 270°.
    judge(&rotate90(a), b)
}

pub fn similar(a: &Icon, b: &Icon) -> bool {
    Calibration::STANDARD.similar(a, b)
}

pub fn custom_similar(a: &Icon, b: &Icon, coeff: &CustomCoefficients) -> bool {
    Calibration::STANDARD.custom_similar(a, b, coeff)
}

pub fn similar_with_rotations(a: &Icon, b: &Icon) -> bool {
    Calibration::STANDARD.similar_with_rotations(a, b)
}

pub fn custom_similar_with_rotations(a: &Icon, b: &Icon, coeff: &CustomCoefficients) -> bool {
    Calibration::STANDARD.custom_similar_with_rotations(a, b, coeff)
}
