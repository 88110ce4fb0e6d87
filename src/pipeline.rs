// THEORY:
// The `pipeline` module is the top-level, file-aware API. The core only ever sees
// decoded bitmaps and icons; this layer adds what a deduplication tool needs
// around it:
//
// 1.  **Decoding**: `open` hands a path to the `image` crate's codecs (JPEG, PNG,
//     GIF and friends) and reports failures as `SignatureError::Decode`.
// 2.  **Configuration**: `PipelineConfig` bundles the calibration, the caller's
//     coefficients and whether quarter turns count as matches.
// 3.  **Reporting**: `compare` returns every metric plus a `Verdict`, and turns
//     the core's preconditions (no empty icons, equal resolutions) into errors.
// 4.  **Previews**: icons can be written out as tiny PNG or JPEG files to see
//     what survived the downsampling.

use crate::core_modules::calibration::{Calibration, CustomCoefficients};
use crate::core_modules::icon::Icon;
use crate::core_modules::rotation::rotation::rotate90;
use crate::core_modules::similarity::{Metrics, metrics};
use crate::error::SignatureError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Configuration for the SignaturePipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub calibration: Calibration,
    /// `CustomCoefficients::UNIT` selects the default, strict comparison.
    pub coefficients: CustomCoefficients,
    /// Also accept a quarter turn of either image.
    pub check_rotations: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::STANDARD,
            coefficients: CustomCoefficients::UNIT,
            check_rotations: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Similar,
    /// Similar once one of the icons is turned by a quarter.
    SimilarRotated,
    Different,
}

/// The outcome of comparing two icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Metrics of the unrotated pair.
    pub metrics: Metrics,
    pub verdict: Verdict,
}

impl Report {
    pub fn is_similar(&self) -> bool {
        !matches!(self.verdict, Verdict::Different)
    }
}

pub struct SignaturePipeline {
    config: PipelineConfig,
}

impl SignaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn icon_for_image<I>(&self, img: &I) -> Result<Icon, SignatureError>
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        self.config.calibration.icon(img)
    }

    pub fn icon_for_path(&self, path: impl AsRef<Path>) -> Result<Icon, SignatureError> {
        let path = path.as_ref();
        let img = open(path)?;
        debug!(path = %path.display(), "decoded image");
        self.icon_for_image(&img)
    }

    /// Compares two icons and reports metrics and verdict.
    pub fn compare(&self, a: &Icon, b: &Icon) -> Result<Report, SignatureError> {
        if a.is_empty() || b.is_empty() {
            return Err(SignatureError::EmptyIcon);
        }
        if a.side() != b.side() {
            return Err(SignatureError::SideMismatch {
                left: a.side(),
                right: b.side(),
            });
        }

        let verdict = if self.judge(a, b) {
            Verdict::Similar
        } else if self.config.check_rotations && (self.judge(a, &rotate90(b)) || self.judge(&rotate90(a), b)) {
            Verdict::SimilarRotated
        } else {
            Verdict::Different
        };

        Ok(Report {
            metrics: metrics(a, b),
            verdict,
        })
    }

    /// Boolean verdict under this pipeline's policy. Pairs that cannot be
    /// compared are never similar.
    pub fn is_similar(&self, a: &Icon, b: &Icon) -> bool {
        let calibration = &self.config.calibration;
        let coefficients = &self.config.coefficients;
        match (self.uses_default_policy(), self.config.check_rotations) {
            (true, false) => calibration.similar(a, b),
            (true, true) => calibration.similar_with_rotations(a, b),
            (false, false) => calibration.custom_similar(a, b, coefficients),
            (false, true) => calibration.custom_similar_with_rotations(a, b, coefficients),
        }
    }

    fn judge(&self, a: &Icon, b: &Icon) -> bool {
        if self.uses_default_policy() {
            self.config.calibration.similar(a, b)
        } else {
            self.config.calibration.custom_similar(a, b, &self.config.coefficients)
        }
    }

    fn uses_default_policy(&self) -> bool {
        self.config.coefficients == CustomCoefficients::UNIT
    }
}

/// Opens and decodes an image file.
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage, SignatureError> {
    let path = path.as_ref();
    image::open(path).map_err(|source| SignatureError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_png(img: &RgbaImage, path: impl AsRef<Path>) -> Result<(), SignatureError> {
    let path = path.as_ref();
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| SignatureError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes a JPEG. Alpha is dropped, JPEG has none.
pub fn save_jpeg(img: &RgbaImage, path: impl AsRef<Path>, quality: u8) -> Result<(), SignatureError> {
    let path = path.as_ref();
    let encode = || -> Result<(), ImageError> {
        let file = File::create(path).map_err(ImageError::IoError)?;
        let rgb = DynamicImage::ImageRgba8(img.clone()).into_rgb8();
        JpegEncoder::new_with_quality(BufWriter::new(file), quality).encode_image(&rgb)
    };
    encode().map_err(|source| SignatureError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::test_images::{gradient, uniform};
    use image::imageops;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("icon_similarity_{}_{}", std::process::id(), name))
    }

    #[test]
    fn compare_reports_similar_copies() {
        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        let a = pipeline.icon_for_image(&gradient(400, 300)).unwrap();
        let b = pipeline.icon_for_image(&gradient(120, 90)).unwrap();
        let report = pipeline.compare(&a, &b).unwrap();
        assert_eq!(report.verdict, Verdict::Similar);
        assert!(report.is_similar());
        assert!(report.metrics.luma < Calibration::STANDARD.luma_threshold());
    }

    #[test]
    fn compare_reports_rotation_only_when_enabled() {
        let original = gradient(300, 180);
        let plain = SignaturePipeline::new(PipelineConfig::default());
        let rotating = SignaturePipeline::new(PipelineConfig {
            check_rotations: true,
            ..PipelineConfig::default()
        });
        let a = plain.icon_for_image(&original).unwrap();
        let b = plain.icon_for_image(&imageops::rotate90(&original)).unwrap();

        assert_eq!(plain.compare(&a, &b).unwrap().verdict, Verdict::Different);
        assert_eq!(rotating.compare(&a, &b).unwrap().verdict, Verdict::SimilarRotated);
        assert!(rotating.is_similar(&a, &b));
        assert!(!plain.is_similar(&a, &b));
    }

    #[test]
    fn compare_with_exact_coefficients() {
        let pipeline = SignaturePipeline::new(PipelineConfig {
            coefficients: CustomCoefficients::EXACT,
            ..PipelineConfig::default()
        });
        let a = pipeline.icon_for_image(&gradient(400, 300)).unwrap();
        let b = pipeline.icon_for_image(&gradient(120, 91)).unwrap();
        assert_eq!(pipeline.compare(&a, &a).unwrap().verdict, Verdict::Similar);
        assert_eq!(pipeline.compare(&a, &b).unwrap().verdict, Verdict::Different);
    }

    #[test]
    fn compare_rejects_empty_icons() {
        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        let a = pipeline.icon_for_image(&uniform(10, 10, [1, 2, 3])).unwrap();
        assert!(matches!(
            pipeline.compare(&a, &Icon::empty()),
            Err(SignatureError::EmptyIcon)
        ));
    }

    #[test]
    fn compare_rejects_mismatched_resolutions() {
        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        let small = Calibration {
            icon_size: 5,
            samples: 4,
            ..Calibration::STANDARD
        };
        let a = pipeline.icon_for_image(&gradient(30, 30)).unwrap();
        let b = small.icon(&gradient(30, 30)).unwrap();
        match pipeline.compare(&a, &b) {
            Err(SignatureError::SideMismatch { left, right }) => assert_eq!((left, right), (11, 5)),
            other => panic!("expected SideMismatch, got {:?}", other),
        }
    }

    #[test]
    fn png_round_trip_through_files() {
        let path = scratch_path("roundtrip.png");
        let img = gradient(90, 60);
        save_png(&img, &path).unwrap();

        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        let from_file = pipeline.icon_for_path(&path).unwrap();
        let in_memory = pipeline.icon_for_image(&img).unwrap();
        // PNG is lossless.
        assert_eq!(from_file, in_memory);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn jpeg_copy_stays_similar() {
        let path = scratch_path("copy.jpg");
        let img = gradient(160, 120);
        save_jpeg(&img, &path, 75).unwrap();

        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        let a = pipeline.icon_for_image(&img).unwrap();
        let b = pipeline.icon_for_path(&path).unwrap();
        assert!(pipeline.is_similar(&a, &b));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn icon_preview_can_be_saved() {
        let path = scratch_path("preview.png");
        let icon = crate::icon(&gradient(64, 64)).unwrap();
        save_png(&icon.to_rgba_image(), &path).unwrap();
        let reopened = open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (11, 11));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let pipeline = SignaturePipeline::new(PipelineConfig::default());
        match pipeline.icon_for_path(scratch_path("does-not-exist.png")) {
            Err(SignatureError::Decode { path, .. }) => assert!(path.ends_with(format!(
                "icon_similarity_{}_does-not-exist.png",
                std::process::id()
            ))),
            other => panic!("expected Decode error, got {:?}", other),
        }
    }
}
