pub mod calibration;
pub mod frame;
pub mod icon;
pub mod icon_builder;
pub mod resampler;
pub mod rotation;
pub mod similarity;

#[cfg(test)]
pub(crate) mod test_images;
