// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from command-line flags and environment variables

use std::path::PathBuf;

use clap::Parser;

use crate::api::http_server::{ApiConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::vision::classifier::onnx::{
    ClassifierConfig, DEFAULT_LABELS_FILE, DEFAULT_MODEL_DIR, DEFAULT_MODEL_FILE,
};
use crate::vision::classifier::OutputActivation;
use crate::vision::preprocessing::{PreprocessConfig, ResizeMode, DEFAULT_INPUT_SIZE};

/// Image Classifier Node
#[derive(Parser, Debug, Clone)]
#[command(name = "image-classifier-node")]
#[command(version)]
#[command(about = "HTTP image classification service backed by an ONNX model", long_about = None)]
pub struct NodeConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "CLASSIFIER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP server
    #[arg(long, env = "CLASSIFIER_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory holding the model artifact and labels
    #[arg(long, env = "MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Model file name inside the model directory
    #[arg(long, env = "MODEL_FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model_file: String,

    /// Labels file name inside the model directory (one label per line)
    #[arg(long, env = "LABELS_FILE", default_value = DEFAULT_LABELS_FILE)]
    pub labels_file: String,

    /// Square input size expected by the model
    #[arg(long, env = "INPUT_SIZE", default_value_t = DEFAULT_INPUT_SIZE)]
    pub input_size: u32,

    /// How images are fitted to the model input (crop, squish, pad)
    #[arg(long, env = "RESIZE_MODE", default_value = "crop")]
    pub resize_mode: ResizeMode,

    /// Activation applied to model output (softmax, none)
    #[arg(long, env = "OUTPUT_ACTIVATION", default_value = "softmax")]
    pub output_activation: OutputActivation,

    /// Skip ImageNet mean/std normalization
    #[arg(long, env = "NO_NORMALIZE")]
    pub no_normalize: bool,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl NodeConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            listen_addr: self.listen_addr(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model_dir: self.model_dir.clone(),
            model_file: self.model_file.clone(),
            labels_file: self.labels_file.clone(),
            preprocess: PreprocessConfig {
                input_size: self.input_size,
                resize_mode: self.resize_mode,
                normalize: !self.no_normalize,
            },
            activation: self.output_activation,
            intra_threads: self.intra_threads,
        }
    }
}
