// THEORY:
// This file is the main entry point for the `icon_similarity` library crate.
// It exports two layers:
//
// - `core_modules`: the signature algorithm itself. A decoded bitmap goes in, a
//   tiny fixed-size `Icon` comes out, and two icons can be judged similar or
//   not. Everything here is synchronous, pure and free of file I/O.
// - `pipeline` and `parallel_pipeline`: the convenience layer a deduplication
//   tool needs around the core. Decoding files, writing icon previews, producing
//   a comparison report, and fanning work out over many images.
//
// The most common entry points are re-exported at the crate root.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::calibration::{Calibration, CustomCoefficients};
pub use crate::core_modules::frame::frame_view;
pub use crate::core_modules::icon::{Channel, Icon, ImageSize};
pub use crate::core_modules::icon_builder::{icon, icon_nn};
pub use crate::core_modules::rotation::rotation::rotate90;
pub use crate::core_modules::similarity::{
    Metrics, custom_similar, custom_similar_with_rotations, euclidean_metric, proportion_metric, similar,
    similar_with_rotations,
};
pub use crate::error::SignatureError;
