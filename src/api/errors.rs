// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error body, `{"detail": ..., "error_type": ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Upload filename is not .png/.jpg/.jpeg
    InvalidFileType,
    /// Multipart body could not be parsed
    InvalidRequest(String),
    /// Required form field absent
    MissingField(String),
    /// Upload exceeded the configured body limit
    PayloadTooLarge(String),
    /// Any failure while decoding, classifying or re-encoding
    ClassificationFailed(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error_type = match self {
            ApiError::InvalidFileType => "invalid_file_type",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::MissingField(_) => "validation_error",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::ClassificationFailed(_) => "classification_failed",
        };

        ErrorResponse {
            detail: self.to_string(),
            error_type: error_type.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidFileType | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ClassificationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidFileType => write!(f, "Invalid file type"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid multipart body: {}", msg),
            ApiError::MissingField(field) => write!(f, "Field '{}' is required", field),
            ApiError::PayloadTooLarge(msg) => write!(f, "Upload too large: {}", msg),
            ApiError::ClassificationFailed(msg) => write!(f, "Classification failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
