// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub labels: Vec<String>,
}

/// GET /health - liveness plus the loaded model's vocabulary
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let classifier = &state.classifier;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        model: classifier.name().to_string(),
        labels: classifier.vocab().labels().to_vec(),
    })
}
