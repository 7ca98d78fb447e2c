// src/model/artifact.rs
//! The trained classifier as it lives on disk: one versioned JSON document
//! with the logistic-regression weights and enough metadata to refuse an
//! artifact the running code cannot interpret. Writes go through a tmp file
//! and a rename so a crashed trainer never leaves a half-written model.

use crate::error::ScoreError;
use crate::model::features::{self, FEATURIZER_ID, TOTAL_DIMS};
use crate::model::SentenceModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Bump alongside `FEATURIZER_ID` on any incompatible layout change.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub featurizer: String,
    pub feature_dims: usize,
    pub weights: Vec<f32>,
    pub bias: f32,
    pub trained_sentences: usize,
    pub positive_share: f32,
    pub validation_accuracy: f32,
}

impl ModelArtifact {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| ScoreError::Artifact(format!("read {}: {e}", path.display())))?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)
            .map_err(|e| ScoreError::Artifact(format!("parse {}: {e}", path.display())))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ScoreError::Artifact(format!(
                "version mismatch: artifact v{}, supported v{ARTIFACT_VERSION}",
                self.version
            )));
        }
        if self.featurizer != FEATURIZER_ID {
            return Err(ScoreError::Artifact(format!(
                "featurizer mismatch: artifact `{}`, supported `{FEATURIZER_ID}`",
                self.featurizer
            )));
        }
        if self.feature_dims != TOTAL_DIMS || self.weights.len() != TOTAL_DIMS {
            return Err(ScoreError::Artifact(format!(
                "dimension mismatch: artifact {} dims / {} weights, supported {TOTAL_DIMS}",
                self.feature_dims,
                self.weights.len()
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(ScoreError::Artifact("non-finite weights".to_string()));
        }
        Ok(())
    }

    /// Atomic save: tmp file in the same directory, then rename.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut f = fs::File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Logistic regression over the shared featurizer.
#[derive(Debug, Clone)]
pub struct LinearSentenceModel {
    artifact: ModelArtifact,
}

impl LinearSentenceModel {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl SentenceModel for LinearSentenceModel {
    fn predict(&self, sentence: &str) -> f32 {
        let mut z = self.artifact.bias;
        for (dim, value) in features::featurize(sentence) {
            z += self.artifact.weights[dim as usize] * value;
        }
        sigmoid(z)
    }

    fn name(&self) -> &'static str {
        "linear-fnv"
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
