// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify endpoint handler

use std::time::Instant;

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::request::UploadedFile;
use super::response::ClassifyResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::classifier::{ClassifierError, ImageClassifier};
use crate::vision::image_utils::{decode_rgb_image, jpeg_data_uri, ImageError};

/// Anything that can go wrong after the upload passed validation
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// POST /classify - Classify an uploaded image
///
/// Accepts a multipart form with a `file` field and returns the predicted
/// label with per-class probabilities.
///
/// # Request
/// - `file`: image upload, filename must end in .png, .jpg or .jpeg
///
/// # Response
/// - `prediction`: predicted label
/// - `confidence`: probability of the predicted label
/// - `details`: probability for every label in the vocabulary
/// - `image`: the upload re-encoded as `data:image/jpeg;base64,...`
///
/// # Errors
/// - 400 Bad Request: invalid file type, non-multipart or malformed body
/// - 422 Unprocessable Entity: no `file` field
/// - 500 Internal Server Error: decode, inference or encoding failed
pub async fn classify_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        warn!("Classify request rejected: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    })?;

    let upload = UploadedFile::from_multipart(multipart).await.map_err(|e| {
        warn!("Classify request rejected: {}", e);
        e
    })?;

    if let Err(e) = upload.validate() {
        warn!("Rejected upload '{}': {}", upload.file_name, e);
        return Err(e);
    }

    debug!(
        "Classify request for '{}' ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let start = Instant::now();
    let classifier = state.classifier.clone();
    let bytes = upload.bytes.clone();

    let result = tokio::task::spawn_blocking(move || classify_bytes(classifier.as_ref(), &bytes))
        .await
        .map_err(|e| ApiError::ClassificationFailed(format!("classification task failed: {}", e)))?;

    let response = result.map_err(|e| {
        warn!("Classification of '{}' failed: {}", upload.file_name, e);
        ApiError::ClassificationFailed(e.to_string())
    })?;

    info!(
        "Classified '{}' as '{}' ({:.4} confidence, {}ms)",
        upload.file_name,
        response.prediction,
        response.confidence,
        start.elapsed().as_millis()
    );

    Ok(Json(response))
}

/// Decode, re-encode and classify one upload
///
/// Runs synchronously; callers on the async runtime should move it onto a
/// blocking thread.
pub fn classify_bytes(
    classifier: &dyn ImageClassifier,
    bytes: &[u8],
) -> Result<ClassifyResponse, ClassifyError> {
    let (rgb, info) = decode_rgb_image(bytes)?;
    debug!(
        "Decoded image: {}x{} {:?}, {} bytes",
        info.width, info.height, info.format, info.size_bytes
    );

    let image = jpeg_data_uri(&rgb)?;
    let prediction = classifier.predict(&rgb)?;

    Ok(ClassifyResponse::new(classifier.vocab(), prediction, image))
}
