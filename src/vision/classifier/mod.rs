// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image classifier abstraction
//!
//! A classifier owns a fixed, ordered vocabulary of labels and maps an RGB
//! image to a probability vector aligned with that vocabulary. It is loaded
//! once at startup and shared read-only across requests.

pub mod onnx;
pub mod vocabulary;

use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use thiserror::Error;

pub use onnx::{ClassifierConfig, OnnxImageClassifier};
pub use vocabulary::Vocabulary;

/// Errors raised while loading or running a classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model file not found at {0}")]
    ModelNotFound(String),

    #[error("Labels file not found at {0}")]
    LabelsNotFound(String),

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Failed to load model: {0}")]
    LoadFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Model produced {actual} scores but the vocabulary has {expected} labels")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}

/// Result of a single `predict` call
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted label (member of the vocabulary)
    pub label: String,
    /// Index of the predicted label in the vocabulary
    pub index: usize,
    /// Probabilities aligned with the vocabulary, summing to ~1.0
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Build a prediction from a probability vector, picking the argmax label
    pub fn from_probabilities(
        vocab: &Vocabulary,
        probabilities: Vec<f32>,
    ) -> Result<Self, ClassifierError> {
        if probabilities.len() != vocab.len() {
            return Err(ClassifierError::OutputMismatch {
                expected: vocab.len(),
                actual: probabilities.len(),
            });
        }

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::InferenceFailed(
                "model produced non-finite scores".to_string(),
            ));
        }

        let index = argmax(&probabilities).ok_or_else(|| {
            ClassifierError::InferenceFailed("empty probability vector".to_string())
        })?;

        Ok(Self {
            label: vocab.labels()[index].clone(),
            index,
            probabilities,
        })
    }

    /// Probability of the predicted label
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.index]
    }
}

/// A loaded image classifier
///
/// Implementations must be safe to share across request handlers; nothing
/// about the classifier changes after it is constructed.
pub trait ImageClassifier: Send + Sync {
    /// Ordered label vocabulary, aligned with `Prediction::probabilities`
    fn vocab(&self) -> &Vocabulary;

    /// Classify a decoded RGB image
    fn predict(&self, image: &RgbImage) -> Result<Prediction, ClassifierError>;

    /// Human-readable model name for logs and `/health`
    fn name(&self) -> &str;
}

/// Final activation applied to the raw model output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputActivation {
    /// Model emits logits, apply softmax
    #[default]
    Softmax,
    /// Model already emits probabilities
    None,
}

impl OutputActivation {
    pub fn apply(&self, scores: &[f32]) -> Vec<f32> {
        match self {
            Self::Softmax => softmax(scores),
            Self::None => scores.to_vec(),
        }
    }
}

impl FromStr for OutputActivation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "softmax" => Ok(Self::Softmax),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown output activation '{}', expected softmax or none",
                other
            )),
        }
    }
}

impl fmt::Display for OutputActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Softmax => f.write_str("softmax"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties resolve to the earliest index
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
