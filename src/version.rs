// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Image Classifier Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-image-classification-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "classify-endpoint",
    "onnx-runtime",
    "jpeg-data-uri",
    "permissive-cors",
    "health-endpoint",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Image Classifier Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
