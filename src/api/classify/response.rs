// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify response types

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::vision::classifier::{Prediction, Vocabulary};

/// Per-class probabilities keyed by label, serialized in vocabulary order
#[derive(Debug, Clone, PartialEq)]
pub struct LabelProbabilities(Vec<(String, f32)>);

impl LabelProbabilities {
    /// Pair every vocabulary label with its probability
    pub fn new(vocab: &Vocabulary, probabilities: &[f32]) -> Self {
        Self(
            vocab
                .labels()
                .iter()
                .cloned()
                .zip(probabilities.iter().copied())
                .collect(),
        )
    }
}

impl Serialize for LabelProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, probability) in &self.0 {
            map.serialize_entry(label, probability)?;
        }
        map.end()
    }
}

/// Response from POST /classify
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    /// Predicted label
    pub prediction: String,
    /// Probability of the predicted label (0.0-1.0)
    pub confidence: f32,
    /// Probability for every vocabulary label
    pub details: LabelProbabilities,
    /// The uploaded image re-encoded as a JPEG data URI
    pub image: String,
}

impl ClassifyResponse {
    pub fn new(vocab: &Vocabulary, prediction: Prediction, image: String) -> Self {
        let details = LabelProbabilities::new(vocab, &prediction.probabilities);
        Self {
            confidence: prediction.confidence(),
            prediction: prediction.label,
            details,
            image,
        }
    }
}
