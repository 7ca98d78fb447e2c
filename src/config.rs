// src/config.rs
//! Scoring configuration: rule weights and caps, lexicons, pipeline limits,
//! blend policy and labeler settings, all in one TOML document. A copy ships
//! embedded in the binary; `SCORING_CONFIG_PATH` points at a replacement file,
//! and a couple of narrow env overrides exist for deploy-time tuning.

use anyhow::Context;
use serde::Deserialize;
use std::fs;

/// Embedded default configuration (same file as `config/scoring.toml`).
pub const DEFAULT_SCORING_TOML: &str = include_str!("../config/scoring.toml");

pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";
pub const ENV_MIN_CHARS_TEXT: &str = "MIN_CHARS_TEXT";
pub const ENV_MIN_SENT_FOR_ML: &str = "MIN_SENT_FOR_ML";

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    pub scorer: ScorerConfig,
    pub pipeline: PipelineLimits,
    pub blend: BlendConfig,
    pub labeler: LabelerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorerConfig {
    #[serde(default = "default_prob_floor")]
    pub prob_floor: f32,
    #[serde(default = "default_prob_ceiling")]
    pub prob_ceiling: f32,
    pub weights: RuleWeights,
    pub caps: RuleCaps,
    pub lexicons: Lexicons,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleWeights {
    pub sensational: f32,
    pub exclamations: f32,
    pub questions: f32,
    pub all_caps: f32,
    pub uncited_figures: f32,
    /// Subtracted from the accumulator; keep it positive here.
    pub credibility: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleCaps {
    pub sensational_density: f32,
    pub all_caps_ratio: f32,
    pub uncited_density: f32,
    pub credibility_density: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lexicons {
    pub sensational: Vec<String>,
    pub clickbait: Vec<String>,
    pub credibility: Vec<String>,
    #[serde(default)]
    pub acronym_allowlist: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineLimits {
    #[serde(default = "default_min_chars_text")]
    pub min_chars_text: usize,
    #[serde(default = "default_min_sent_for_ml")]
    pub min_sentences_for_ml: usize,
    #[serde(default = "default_ml_min_chars")]
    pub ml_sentence_min_chars: usize,
    #[serde(default = "default_ml_max_chars")]
    pub ml_sentence_max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlendConfig {
    pub heuristic: f32,
    pub model: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelerConfig {
    pub positive_cutoff: f32,
    pub reputable_cutoff: f32,
    pub reputable_weight: f32,
    pub min_sentence_chars: usize,
    pub max_negative_ratio: f32,
    pub loaded_language: Vec<String>,
    pub patterns: Vec<String>,
}

fn default_prob_floor() -> f32 {
    0.01
}
fn default_prob_ceiling() -> f32 {
    0.98
}
fn default_min_chars_text() -> usize {
    120
}
fn default_min_sent_for_ml() -> usize {
    3
}
fn default_ml_min_chars() -> usize {
    20
}
fn default_ml_max_chars() -> usize {
    600
}

impl ScoringConfig {
    /// Parse from a TOML string and sanitize ranges.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: ScoringConfig =
            toml::from_str(toml_str).context("parse scoring config TOML")?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// The embedded default. The shipped TOML is validated by tests, so a
    /// parse failure here is a build defect, not a runtime condition.
    pub fn default_embedded() -> Self {
        Self::from_toml_str(DEFAULT_SCORING_TOML).expect("embedded scoring config is valid")
    }

    /// Load from `SCORING_CONFIG_PATH` when set, else the embedded default,
    /// then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(ENV_SCORING_CONFIG_PATH) {
            Ok(path) => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("read scoring config from {path}"))?;
                Self::from_toml_str(&content)?
            }
            Err(_) => Self::default_embedded(),
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_MIN_CHARS_TEXT) {
            if let Ok(n) = v.trim().parse::<usize>() {
                self.pipeline.min_chars_text = n;
            }
        }
        if let Ok(v) = std::env::var(ENV_MIN_SENT_FOR_ML) {
            if let Ok(n) = v.trim().parse::<usize>() {
                self.pipeline.min_sentences_for_ml = n;
            }
        }
    }

    fn sanitize(&mut self) {
        let s = &mut self.scorer;
        s.prob_floor = s.prob_floor.clamp(0.0, 1.0);
        s.prob_ceiling = s.prob_ceiling.clamp(0.0, 1.0);
        if s.prob_floor > s.prob_ceiling {
            std::mem::swap(&mut s.prob_floor, &mut s.prob_ceiling);
        }
        // lexicon matching is lowercase substring; normalize once here
        for list in [
            &mut s.lexicons.sensational,
            &mut s.lexicons.clickbait,
            &mut s.lexicons.credibility,
        ] {
            for term in list.iter_mut() {
                *term = term.trim().to_lowercase();
            }
            list.retain(|t| !t.is_empty());
        }

        let b = &mut self.blend;
        b.heuristic = b.heuristic.max(0.0);
        b.model = b.model.max(0.0);
        if b.heuristic + b.model <= f32::EPSILON {
            b.heuristic = 0.4;
            b.model = 0.6;
        }

        let l = &mut self.labeler;
        l.positive_cutoff = l.positive_cutoff.clamp(0.0, 1.0);
        l.reputable_cutoff = l.reputable_cutoff.clamp(0.0, 1.0);
        l.reputable_weight = l.reputable_weight.clamp(0.0, 1.0);
        if l.reputable_cutoff < l.positive_cutoff {
            l.reputable_cutoff = l.positive_cutoff;
        }
        if l.max_negative_ratio < 1.0 {
            l.max_negative_ratio = 1.0;
        }
        for term in l.loaded_language.iter_mut() {
            *term = term.trim().to_lowercase();
        }
        l.loaded_language.retain(|t| !t.is_empty());

        let p = &mut self.pipeline;
        if p.ml_sentence_min_chars > p.ml_sentence_max_chars {
            std::mem::swap(&mut p.ml_sentence_min_chars, &mut p.ml_sentence_max_chars);
        }
    }
}
