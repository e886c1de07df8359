// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the classifier input tensor

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for ImageNet-style classifiers
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Mean values for normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Gray used to fill letterbox padding
const PAD_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// How an arbitrary image is fitted to the square model input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Scale to cover the target, then center crop
    #[default]
    Crop,
    /// Resize to exact size (may distort aspect ratio)
    Squish,
    /// Scale to fit inside the target, pad the rest with gray
    Pad,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crop" => Ok(Self::Crop),
            "squish" => Ok(Self::Squish),
            "pad" => Ok(Self::Pad),
            other => Err(format!(
                "unknown resize mode '{}', expected crop, squish or pad",
                other
            )),
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crop => "crop",
            Self::Squish => "squish",
            Self::Pad => "pad",
        };
        f.write_str(name)
    }
}

/// Preprocessing settings, fixed for the lifetime of a loaded model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    pub input_size: u32,
    pub resize_mode: ResizeMode,
    /// Apply ImageNet mean/std after scaling to [0, 1]
    pub normalize: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            resize_mode: ResizeMode::default(),
            normalize: true,
        }
    }
}

/// Preprocess an RGB image for classification
///
/// Steps:
/// 1. Fit to `input_size` x `input_size` using the configured resize mode
/// 2. Scale pixels to [0, 1]
/// 3. Optionally normalize with ImageNet mean/std: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_classifier(image: &RgbImage, config: &PreprocessConfig) -> Array4<f32> {
    let size = config.input_size;
    let resized = resize_to_square(image, size, config.resize_mode);

    let side = size as usize;
    let mut tensor = Array4::zeros((1, 3, side, side));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let scaled = pixel[c] as f32 / 255.0;
            let value = if config.normalize {
                (scaled - MEAN[c]) / STD[c]
            } else {
                scaled
            };
            tensor[[0, c, y as usize, x as usize]] = value;
        }
    }

    tensor
}

/// Fit an image into a square of `target_size`
pub fn resize_to_square(image: &RgbImage, target_size: u32, mode: ResizeMode) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return RgbImage::from_pixel(target_size, target_size, PAD_GRAY);
    }

    match mode {
        ResizeMode::Squish => {
            image::imageops::resize(image, target_size, target_size, FilterType::Triangle)
        }
        ResizeMode::Crop => center_crop_resize(image, target_size),
        ResizeMode::Pad => letterbox_resize(image, target_size),
    }
}

fn center_crop_resize(image: &RgbImage, target_size: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    // Cover the target, so use the larger scale
    let scale = (target_size as f32 / orig_w as f32).max(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).max(target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(target_size);

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let crop_x = (new_w - target_size) / 2;
    let crop_y = (new_h - target_size) / 2;

    image::imageops::crop_imm(&resized, crop_x, crop_y, target_size, target_size).to_image()
}

fn letterbox_resize(image: &RgbImage, target_size: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    // Fit inside the target, so use the smaller scale
    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let mut output = RgbImage::from_pixel(target_size, target_size, PAD_GRAY);
    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;
    image::imageops::replace(&mut output, &resized, offset_x as i64, offset_y as i64);

    output
}
