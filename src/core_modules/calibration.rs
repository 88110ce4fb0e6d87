// THEORY:
// The `Calibration` module holds every number the signature algorithm depends on.
// Icon resolution, sampling density and the similarity thresholds were tuned
// together, so they live in one immutable struct instead of being scattered as
// loose constants. The thresholds are expressed in the decoded [0, 255] color
// domain and are squared, because the Euclidean metric never takes a root.
//
// Key architectural principles:
// 1.  **One Source of Truth**: `Calibration::STANDARD` is the tuned configuration.
//     Everything derived from it (intermediate grid size, thresholds) is computed
//     by methods, never stored twice.
// 2.  **Swappable, Not Mutable**: A caller experimenting with a different icon
//     resolution builds a new `Calibration`. Nothing mutates one at runtime.
// 3.  **Caller Tuning**: `CustomCoefficients` scale the thresholds per channel
//     without touching the calibration itself.

use crate::error::SignatureError;

/// Fixed-point scale: an icon stores `value * 255` for a color value in [0, 255].
pub const FIXED_POINT_SCALE: f64 = 255.0;
/// Upper bound of a normalized channel, 255².
pub const NORMALIZED_MAX: u32 = 255 * 255;

/// The tuned constants of the icon generator and the similarity engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// Side length S of the final square icon.
    pub icon_size: usize,
    /// Source samples per intermediate cell along each axis (K).
    pub samples: usize,
    /// Per-pixel color difference cutoff, in [0, 255] units.
    pub color_diff: f64,
    /// Fraction of the worst case squared distance tolerated.
    pub euclidean_coeff: f64,
    /// How much more lenient the chroma channels are than luma.
    pub chroma_coeff: f64,
    /// Maximum relative difference of aspect ratios (5%).
    pub proportion_threshold: f64,
}

impl Calibration {
    /// 11x11 icons sampled from a 276x276 grid. Thresholds were calibrated for
    /// exactly this resolution; change them together or not at all.
    pub const STANDARD: Calibration = Calibration {
        icon_size: 11,
        samples: 12,
        color_diff: 50.0,
        euclidean_coeff: 0.2,
        chroma_coeff: 2.0,
        proportion_threshold: 0.05,
    };

    /// Validating constructor. Sizes must be non-zero, tolerances finite and
    /// non-negative.
    pub fn new(
        icon_size: usize,
        samples: usize,
        color_diff: f64,
        euclidean_coeff: f64,
        chroma_coeff: f64,
        proportion_threshold: f64,
    ) -> Result<Self, SignatureError> {
        let calibration = Self {
            icon_size,
            samples,
            color_diff,
            euclidean_coeff,
            chroma_coeff,
            proportion_threshold,
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Checks a calibration built by hand through its public fields.
    pub fn validate(&self) -> Result<(), SignatureError> {
        for (name, size) in [("icon_size", self.icon_size), ("samples", self.samples)] {
            if size == 0 {
                return Err(SignatureError::InvalidCalibration { name, value: 0.0 });
            }
        }
        for (name, value) in [
            ("color_diff", self.color_diff),
            ("euclidean_coeff", self.euclidean_coeff),
            ("chroma_coeff", self.chroma_coeff),
            ("proportion_threshold", self.proportion_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SignatureError::InvalidCalibration { name, value });
            }
        }
        Ok(())
    }

    /// Number of pixels in one channel plane of the final icon (S²).
    pub fn num_pixels(&self) -> usize {
        self.icon_size * self.icon_size
    }

    /// Side of the intermediate block-averaged grid, 2S+1.
    pub fn large_icon_size(&self) -> usize {
        self.icon_size * 2 + 1
    }

    /// Side of the nearest-neighbor resampled source grid, (2S+1)·K.
    pub fn resized_size(&self) -> usize {
        self.large_icon_size() * self.samples
    }

    /// Squared Euclidean threshold for the luma channel.
    pub fn luma_threshold(&self) -> f64 {
        self.num_pixels() as f64 * self.color_diff * self.color_diff * self.euclidean_coeff
    }

    /// Squared Euclidean threshold for each chroma channel.
    pub fn chroma_threshold(&self) -> f64 {
        self.luma_threshold() * self.chroma_coeff
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Threshold multipliers for custom comparisons.
///
/// 0 demands exact equality on that channel, 1 is the calibrated tolerance and
/// anything above 1 loosens it further. No upper bound is enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomCoefficients {
    /// Luma (grayscale information).
    pub luma: f64,
    /// Chrominance b (color information).
    pub chroma_b: f64,
    /// Chrominance r (color information).
    pub chroma_r: f64,
    /// Proportion tolerance (how similar the image borders are).
    pub proportion: f64,
}

impl CustomCoefficients {
    /// All zeros: only identical icons match.
    pub const EXACT: CustomCoefficients = CustomCoefficients {
        luma: 0.0,
        chroma_b: 0.0,
        chroma_r: 0.0,
        proportion: 0.0,
    };

    /// All ones: the calibrated tolerance.
    pub const UNIT: CustomCoefficients = CustomCoefficients {
        luma: 1.0,
        chroma_b: 1.0,
        chroma_r: 1.0,
        proportion: 1.0,
    };

    /// Validating constructor. Every coefficient must be finite and non-negative.
    pub fn new(luma: f64, chroma_b: f64, chroma_r: f64, proportion: f64) -> Result<Self, SignatureError> {
        for (name, value) in [
            ("luma", luma),
            ("chroma_b", chroma_b),
            ("chroma_r", chroma_r),
            ("proportion", proportion),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SignatureError::InvalidCoefficient { name, value });
            }
        }
        Ok(Self {
            luma,
            chroma_b,
            chroma_r,
            proportion,
        })
    }
}

impl Default for CustomCoefficients {
    fn default() -> Self {
        Self::UNIT
    }
}
