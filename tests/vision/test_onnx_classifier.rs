// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX classifier tests
//!
//! The model-backed tests need an exported classifier in `./models/classifier`
//! (`model.onnx` + `labels.txt`) and are ignored by default:
//!
//! ```text
//! cargo test --test vision_tests -- --ignored
//! ```

use image::{Rgb, RgbImage};
use image_classifier_node::vision::{
    ClassifierConfig, ClassifierError, ImageClassifier, OnnxImageClassifier, Vocabulary,
};
use std::path::Path;
use tempfile::TempDir;

const MODEL_DIR: &str = "./models/classifier";

fn model_config() -> ClassifierConfig {
    ClassifierConfig {
        model_dir: Path::new(MODEL_DIR).to_path_buf(),
        ..Default::default()
    }
}

fn sample_image() -> RgbImage {
    RgbImage::from_fn(100, 100, |x, y| Rgb([(x * 2) as u8, (y * 2) as u8, 128]))
}

#[test]
#[ignore] // Requires model files
fn test_predict_on_loaded_model() {
    let classifier = OnnxImageClassifier::load(&model_config())
        .unwrap_or_else(|e| panic!("Failed to load classifier: {}", e));

    let prediction = classifier.predict(&sample_image()).unwrap();
    let vocab = classifier.vocab();

    assert_eq!(prediction.probabilities.len(), vocab.len());
    let sum: f32 = prediction.probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-3, "probabilities sum to {}", sum);

    assert_eq!(vocab.labels()[prediction.index], prediction.label);
    assert!(prediction
        .probabilities
        .iter()
        .all(|&p| p <= prediction.confidence()));
}

#[test]
#[ignore] // Requires model files
fn test_predict_is_deterministic() {
    let classifier = OnnxImageClassifier::load(&model_config()).unwrap();

    let first = classifier.predict(&sample_image()).unwrap();
    let second = classifier.predict(&sample_image()).unwrap();

    assert_eq!(first.label, second.label);
    assert_eq!(first.probabilities, second.probabilities);
}

#[test]
#[ignore] // Requires model files
fn test_load_rejects_labels_that_do_not_match_output() {
    let config = model_config();
    let labels = Vocabulary::from_file(config.labels_path()).unwrap();

    // Same model, one label too many
    let dir = TempDir::new().unwrap();
    std::fs::copy(config.model_path(), dir.path().join("model.onnx")).unwrap();
    let mut lines = labels.labels().join("\n");
    lines.push_str("\nnot-a-model-class\n");
    std::fs::write(dir.path().join("labels.txt"), lines).unwrap();

    let result = OnnxImageClassifier::load(&ClassifierConfig {
        model_dir: dir.path().to_path_buf(),
        ..Default::default()
    });

    match result {
        Err(ClassifierError::OutputMismatch { expected, actual }) => {
            assert_eq!(expected, labels.len() + 1);
            assert_eq!(actual, labels.len());
        }
        other => panic!("expected OutputMismatch, got {:?}", other),
    }
}

#[test]
fn test_load_reports_missing_model_dir() {
    let dir = TempDir::new().unwrap();
    let result = OnnxImageClassifier::load(&ClassifierConfig {
        model_dir: dir.path().join("absent"),
        ..Default::default()
    });

    assert!(matches!(result, Err(ClassifierError::ModelNotFound(_))));
}
