// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime image classifier
//!
//! Loads an exported classification model (`model.onnx`) together with its
//! label vocabulary (`labels.txt`) from a model directory. Runs on CPU.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::RgbImage;
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::{ClassifierError, ImageClassifier, OutputActivation, Prediction, Vocabulary};
use crate::vision::preprocessing::{preprocess_for_classifier, PreprocessConfig};

/// Default model directory, relative to the working directory
pub const DEFAULT_MODEL_DIR: &str = "./models/classifier";
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";
pub const DEFAULT_LABELS_FILE: &str = "labels.txt";

/// Allowed drift from 1.0 when the model emits probabilities directly
const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

/// Configuration for loading the classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Directory holding the model artifact and its labels
    pub model_dir: PathBuf,
    pub model_file: String,
    pub labels_file: String,
    pub preprocess: PreprocessConfig,
    pub activation: OutputActivation,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            labels_file: DEFAULT_LABELS_FILE.to_string(),
            preprocess: PreprocessConfig::default(),
            activation: OutputActivation::default(),
            intra_threads: 4,
        }
    }
}

impl ClassifierConfig {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.model_dir.join(&self.labels_file)
    }

    /// Check that the model artifact exists before touching ONNX Runtime
    pub fn check_artifacts(&self) -> Result<(), ClassifierError> {
        let model_path = self.model_path();
        if !model_path.is_file() {
            return Err(ClassifierError::ModelNotFound(
                model_path.display().to_string(),
            ));
        }
        let labels_path = self.labels_path();
        if !labels_path.is_file() {
            return Err(ClassifierError::LabelsNotFound(
                labels_path.display().to_string(),
            ));
        }
        Ok(())
    }
}

/// ONNX-backed image classifier
///
/// The session is behind a mutex because `Session::run` takes `&mut self`;
/// everything else is immutable after `load`.
#[derive(Clone)]
pub struct OnnxImageClassifier {
    session: Arc<Mutex<Session>>,
    vocab: Vocabulary,
    input_name: String,
    preprocess: PreprocessConfig,
    activation: OutputActivation,
    model_name: String,
}

impl std::fmt::Debug for OnnxImageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxImageClassifier")
            .field("model_name", &self.model_name)
            .field("vocab_size", &self.vocab.len())
            .field("input_name", &self.input_name)
            .field("preprocess", &self.preprocess)
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

impl OnnxImageClassifier {
    /// Load the classifier from its model directory
    ///
    /// # Errors
    /// Returns error if:
    /// - `model.onnx` or `labels.txt` is missing
    /// - The labels file is empty or has duplicates
    /// - ONNX Runtime initialization fails
    /// - The model output size does not match the vocabulary
    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        config.check_artifacts()?;

        let model_path = config.model_path();
        info!("Loading image classifier from {}", model_path.display());

        let vocab = Vocabulary::from_file(config.labels_path())?;
        info!("Loaded vocabulary with {} labels", vocab.len());

        let session = build_session(&model_path, config.intra_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());
        debug!("Classifier model input: {}", input_name);

        let model_name = config
            .model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.model_file.clone());

        let classifier = Self {
            session: Arc::new(Mutex::new(session)),
            vocab,
            input_name,
            preprocess: config.preprocess,
            activation: config.activation,
            model_name,
        };

        // Validation inference on a blank tensor
        let size = config.preprocess.input_size as usize;
        let scores = classifier.run(Array4::zeros((1, 3, size, size)))?;
        check_model_output(&scores, classifier.vocab.len(), config.activation)?;

        info!(
            "✅ Image classifier loaded ({} labels, {}x{} input, {} resize, {} activation)",
            classifier.vocab.len(),
            size,
            size,
            config.preprocess.resize_mode,
            config.activation
        );

        Ok(classifier)
    }

    /// Run the model on a preprocessed NCHW tensor and return raw scores
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_value = Value::from_array(input)
            .map_err(|e| ClassifierError::InferenceFailed(format!("input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::InferenceFailed("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(|e| ClassifierError::InferenceFailed(e.to_string()))?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassifierError::InferenceFailed(format!("output tensor: {}", e)))?;
        debug!("Classifier output shape: {:?}", output_tensor.shape());

        // [1, N] and [N] both flatten to the N class scores
        Ok(output_tensor.iter().copied().collect())
    }
}

/// Check raw model output against the vocabulary and the configured activation
///
/// Without softmax the model itself must emit a probability distribution.
pub fn check_model_output(
    scores: &[f32],
    vocab_len: usize,
    activation: OutputActivation,
) -> Result<(), ClassifierError> {
    if scores.len() != vocab_len {
        return Err(ClassifierError::OutputMismatch {
            expected: vocab_len,
            actual: scores.len(),
        });
    }

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ClassifierError::InvalidOutput(
            "model produced non-finite scores".to_string(),
        ));
    }

    if activation == OutputActivation::None {
        let sum: f32 = scores.iter().sum();
        if scores.iter().any(|&s| s < 0.0) || (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ClassifierError::InvalidOutput(format!(
                "scores sum to {:.4} but output activation is none; use softmax for logit models",
                sum
            )));
        }
    }

    Ok(())
}

fn load_err(e: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::LoadFailed(e.to_string())
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session, ClassifierError> {
    Session::builder()
        .map_err(load_err)?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .map_err(load_err)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(load_err)?
        .with_intra_threads(intra_threads)
        .map_err(load_err)?
        .commit_from_file(model_path)
        .map_err(|e| {
            ClassifierError::LoadFailed(format!(
                "failed to load ONNX model from {}: {}",
                model_path.display(),
                e
            ))
        })
}

impl ImageClassifier for OnnxImageClassifier {
    fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    fn predict(&self, image: &RgbImage) -> Result<Prediction, ClassifierError> {
        let input = preprocess_for_classifier(image, &self.preprocess);
        let scores = self.run(input)?;
        let probabilities = self.activation.apply(&scores);
        Prediction::from_probabilities(&self.vocab, probabilities)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
