// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify API endpoint module
//!
//! Provides POST /classify for labelling an uploaded image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{classify_bytes, classify_handler, ClassifyError};
pub use request::{has_allowed_extension, UploadedFile};
pub use response::{ClassifyResponse, LabelProbabilities};
