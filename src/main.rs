// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use image_classifier_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    version,
    vision::{ImageClassifier, OnnxImageClassifier},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = NodeConfig::parse();

    tracing::info!("🚀 Starting {}", version::get_version_string());
    tracing::info!("📦 Build version: {}", version::VERSION);
    tracing::info!("Features: {}", version::FEATURES.join(", "));

    // The model is required: refuse to start without it
    let classifier_config = config.classifier_config();
    let classifier = OnnxImageClassifier::load(&classifier_config).with_context(|| {
        format!(
            "Failed to load image classifier from {}",
            classifier_config.model_dir.display()
        )
    })?;

    tracing::info!("Classifier vocabulary: {:?}", classifier.vocab().labels());

    let state = AppState::new(Arc::new(classifier));
    start_server(config.api_config(), state).await
}
