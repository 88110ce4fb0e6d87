use std::path::PathBuf;

/// Errors raised while generating or comparing icons.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image has zero area ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, expected {expected} for a {width}x{height} RGBA frame")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("icon of side {side} needs {expected} values, got {actual}")]
    InvalidLayout {
        side: usize,
        expected: usize,
        actual: usize,
    },
    #[error("icon carries no signature")]
    EmptyIcon,
    #[error("icons have different resolutions ({left} vs {right})")]
    SideMismatch { left: usize, right: usize },
    #[error("calibration field {name} is out of range: {value}")]
    InvalidCalibration { name: &'static str, value: f64 },
    #[error("coefficient {name} must be finite and non-negative, got {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },
    #[error("icon worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
