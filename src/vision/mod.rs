// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image classification
//!
//! This module provides:
//! - Upload decoding, RGB conversion and JPEG data URI encoding
//! - Input tensor preprocessing (resize + ImageNet normalization)
//! - The `ImageClassifier` abstraction and its ONNX Runtime backend

pub mod classifier;
pub mod image_utils;
pub mod preprocessing;

pub use classifier::{
    ClassifierConfig, ClassifierError, ImageClassifier, OnnxImageClassifier, OutputActivation,
    Prediction, Vocabulary,
};
pub use image_utils::{decode_rgb_image, detect_format, jpeg_data_uri, ImageError, ImageInfo};
pub use preprocessing::{PreprocessConfig, ResizeMode};
