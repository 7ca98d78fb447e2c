// src/blend.rs
//! Final-score policy: a fixed convex combination of the heuristic and the
//! classifier signal. With no classifier output the heuristic passes through
//! untouched, so a degraded pipeline is indistinguishable from one that never
//! had a model.

use crate::article::SentenceScore;
use crate::config::BlendConfig;

#[derive(Debug, Clone, Copy)]
pub struct BlendPolicy {
    pub heuristic: f32,
    pub model: f32,
}

impl BlendPolicy {
    pub fn new(cfg: &BlendConfig) -> Self {
        Self {
            heuristic: cfg.heuristic,
            model: cfg.model,
        }
    }

    /// Combine the two signals. `None` means the model did not run; the
    /// heuristic value is returned as-is (no epsilon drift).
    pub fn blend(&self, heur: f32, ml: Option<f32>) -> f32 {
        match ml {
            None => heur,
            Some(m) => {
                let denom = (self.heuristic + self.model).max(1e-6);
                ((self.heuristic * heur + self.model * m) / denom).clamp(0.0, 1.0)
            }
        }
    }
}

/// Document-level classifier score: arithmetic mean over the sentences that
/// have one. `None` when the model scored nothing.
pub fn document_ml(sentences: &[SentenceScore]) -> Option<f32> {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for s in sentences {
        if let Some(p) = s.ml_prob {
            sum += p;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}
