// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify request parsing and validation

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use bytes::Bytes;

use crate::api::errors::ApiError;

/// Multipart form field carrying the image
pub const FILE_FIELD: &str = "file";

/// Accepted upload extensions (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// An uploaded image, alive for one request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Pull the `file` field out of a multipart body
    ///
    /// Other fields are skipped. A `file` field without a filename is kept
    /// with an empty name so it fails extension validation.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;

            return Ok(Self { file_name, bytes });
        }

        Err(ApiError::MissingField(FILE_FIELD.to_string()))
    }

    /// Validate the upload before any decoding happens
    ///
    /// Only the filename is checked; the byte content is not inspected.
    pub fn validate(&self) -> Result<(), ApiError> {
        if has_allowed_extension(&self.file_name) {
            Ok(())
        } else {
            Err(ApiError::InvalidFileType)
        }
    }
}

/// True if `file_name` ends in .png, .jpg or .jpeg, ignoring case
pub fn has_allowed_extension(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn multipart_error(e: axum_extra::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::InvalidRequest(e.body_text())
    }
}
