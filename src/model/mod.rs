// src/model/mod.rs
//! Sentence classifier behind a small trait so the pipeline never cares
//! whether a real artifact is loaded. `ModelHandle::from_env` resolves
//! `MODEL_PATH`, logs what it found, and hands back a disabled handle on any
//! failure; callers degrade to heuristics instead of erroring out.

pub mod artifact;
pub mod features;
pub mod trainer;

use crate::error::ScoreError;
use crate::model::artifact::{LinearSentenceModel, ModelArtifact};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Env var pointing at the trained artifact JSON.
pub const ENV_MODEL_PATH: &str = "MODEL_PATH";
/// Fallback path when `MODEL_PATH` is unset.
pub const DEFAULT_MODEL_PATH: &str = "models/sentence_bias.json";

/// A per-sentence probability-of-bias estimator.
pub trait SentenceModel: Send + Sync + std::fmt::Debug {
    /// Probability in [0,1] that the sentence carries loaded language.
    fn predict(&self, sentence: &str) -> f32;
    fn name(&self) -> &'static str;
}

/// Constant-output model for wiring and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedModel {
    pub value: f32,
}

impl SentenceModel for FixedModel {
    fn predict(&self, _sentence: &str) -> f32 {
        self.value.clamp(0.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Either a loaded model or an explanation of why there is none.
#[derive(Clone, Default)]
pub struct ModelHandle {
    model: Option<Arc<dyn SentenceModel>>,
    detail: Option<String>,
}

impl ModelHandle {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn SentenceModel>) -> Self {
        Self {
            model: Some(model),
            detail: None,
        }
    }

    /// Load from `MODEL_PATH` (or the default path). Failure is not an
    /// error here: the handle comes back disabled and scoring continues
    /// on heuristics alone.
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_MODEL_PATH)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
        Self::from_path(&path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match ModelArtifact::load(path) {
            Ok(artifact) => {
                info!(
                    target: "model",
                    path = %path.display(),
                    dims = artifact.feature_dims,
                    trained_sentences = artifact.trained_sentences,
                    validation_accuracy = artifact.validation_accuracy,
                    "sentence model loaded"
                );
                Self::with_model(Arc::new(LinearSentenceModel::new(artifact)))
            }
            Err(e) => {
                warn!(
                    target: "model",
                    path = %path.display(),
                    error = %e,
                    "sentence model unavailable; scoring degrades to heuristics"
                );
                Self {
                    model: None,
                    detail: Some(e.to_string()),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn get(&self) -> Option<&Arc<dyn SentenceModel>> {
        self.model.as_ref()
    }

    pub fn require(&self) -> Result<&Arc<dyn SentenceModel>, ScoreError> {
        self.model.as_ref().ok_or_else(|| {
            ScoreError::ModelUnavailable(
                self.detail
                    .clone()
                    .unwrap_or_else(|| "no model loaded".to_string()),
            )
        })
    }
}

static MODEL: OnceCell<ModelHandle> = OnceCell::new();

/// Process-wide handle, resolved from the environment on first use.
pub fn global() -> &'static ModelHandle {
    MODEL.get_or_init(ModelHandle::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::ARTIFACT_VERSION;
    use crate::model::features::{FEATURIZER_ID, TOTAL_DIMS};
    use serial_test::serial;

    #[test]
    fn fixed_model_clamps_and_repeats() {
        let m = FixedModel { value: 1.7 };
        assert!((m.predict("anything") - 1.0).abs() < 1e-6);
        let m = FixedModel { value: 0.35 };
        assert!((m.predict("a") - m.predict("b")).abs() < 1e-6);
    }

    #[test]
    fn disabled_handle_reports_unavailable() {
        let h = ModelHandle::disabled();
        assert!(!h.is_available());
        assert!(h.get().is_none());
        let err = h.require().unwrap_err();
        assert!(matches!(err, ScoreError::ModelUnavailable(_)));
    }

    #[test]
    fn missing_artifact_degrades_to_disabled() {
        let h = ModelHandle::from_path("/no/such/model.json");
        assert!(!h.is_available());
        let err = h.require().unwrap_err();
        assert!(err.to_string().contains("model unavailable"));
    }

    #[test]
    #[serial]
    fn from_env_picks_up_model_path() {
        let dir = std::env::temp_dir().join(format!(
            "ncred-handle-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        let artifact = ModelArtifact {
            version: ARTIFACT_VERSION,
            created_at: chrono::Utc::now(),
            featurizer: FEATURIZER_ID.to_string(),
            feature_dims: TOTAL_DIMS,
            weights: vec![0.0; TOTAL_DIMS],
            bias: 0.0,
            trained_sentences: 300,
            positive_share: 0.5,
            validation_accuracy: 0.85,
        };
        artifact.save(&path).unwrap();

        std::env::set_var(ENV_MODEL_PATH, &path);
        let h = ModelHandle::from_env();
        std::env::remove_var(ENV_MODEL_PATH);
        let _ = std::fs::remove_dir_all(&dir);

        assert!(h.is_available());
        let m = h.get().unwrap();
        // zero weights, zero bias: sigmoid(0) for any input
        assert!((m.predict("hello there") - 0.5).abs() < 1e-6);
    }
}
