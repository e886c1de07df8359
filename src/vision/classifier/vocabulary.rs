// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ordered label vocabulary

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::ClassifierError;

/// Ordered list of class labels the classifier was trained on
///
/// Index `i` names the `i`-th entry of every probability vector the model
/// produces. Labels are unique and the list is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    pub fn new(labels: Vec<String>) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::InvalidVocabulary(
                "vocabulary is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ClassifierError::InvalidVocabulary(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Load labels from a text file, one label per line
    ///
    /// Lines are trimmed and blank lines are skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::LabelsNotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| {
            ClassifierError::InvalidVocabulary(format!(
                "failed to open {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut labels = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                ClassifierError::InvalidVocabulary(format!("failed to read labels: {}", e))
            })?;
            let label = line.trim();
            if !label.is_empty() {
                labels.push(label.to_string());
            }
        }

        Self::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
