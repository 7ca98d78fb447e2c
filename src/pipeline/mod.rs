// src/pipeline/mod.rs
//! On-demand scoring driver: length validation, document heuristics, the
//! per-sentence classifier pass, and the blend, assembled into one
//! `ScoredArticle`. Pure and synchronous; async drivers wrap it.

pub mod batch;

use crate::article::{Article, ScoredArticle, SentenceScore};
use crate::blend::{document_ml, BlendPolicy};
use crate::config::{PipelineLimits, ScoringConfig};
use crate::error::ScoreError;
use crate::heuristics::HeuristicEngine;
use crate::model::{self, ModelHandle, SentenceModel};
use crate::sentences::split_sentences;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_articles_total", "Documents scored on demand.");
        describe_counter!(
            "scoring_rejected_total",
            "Documents rejected by the minimum-length validation."
        );
        describe_counter!("scoring_sentences_total", "Sentences scored heuristically.");
        describe_counter!(
            "scoring_ml_sentences_total",
            "Sentences scored by the classifier."
        );
    });
}

// Dev logging gate: SCORING_DEV_LOG=1 AND dev env (debug build or APP_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("SCORING_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short anonymized id for a document. Logs never carry raw text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_score(event: &str, text: &str, prob: f32, flags: &[String]) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let flags_short: Vec<&String> = flags.iter().take(5).collect();
    // Hashed id + flags only, never the text itself.
    info!(target: "pipeline", %id, %prob, event, flags = ?flags_short);
}

/// The assembled scorer. Cheap to clone config-wise; the model is shared.
pub struct ScoringPipeline {
    engine: HeuristicEngine,
    blend: BlendPolicy,
    limits: PipelineLimits,
    model: Option<Arc<dyn SentenceModel>>,
}

impl ScoringPipeline {
    pub fn new(cfg: &ScoringConfig, model: &ModelHandle) -> Self {
        Self {
            engine: HeuristicEngine::new(cfg.scorer.clone()),
            blend: BlendPolicy::new(&cfg.blend),
            limits: cfg.pipeline.clone(),
            model: model.get().cloned(),
        }
    }

    /// Heuristics only, regardless of what artifacts exist on disk.
    pub fn heuristics_only(cfg: &ScoringConfig) -> Self {
        Self::new(cfg, &ModelHandle::disabled())
    }

    /// Config from `SCORING_CONFIG_PATH`/embedded default, model from
    /// `MODEL_PATH` via the process-wide handle.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = ScoringConfig::load()?;
        Ok(Self::new(&cfg, model::global()))
    }

    pub fn model_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn engine(&self) -> &HeuristicEngine {
        &self.engine
    }

    pub fn blend_policy(&self) -> BlendPolicy {
        self.blend
    }

    pub fn limits(&self) -> &PipelineLimits {
        &self.limits
    }

    /// Score raw text as an anonymous single-document article.
    pub fn score_text(&self, text: &str) -> Result<ScoredArticle, ScoreError> {
        self.score_article(&Article::new("", "", text.trim()))
    }

    /// Score a structured article. Document text is title + body; sentences
    /// come from the body alone.
    pub fn score_article(&self, article: &Article) -> Result<ScoredArticle, ScoreError> {
        ensure_metrics_described();
        let doc_text = article.document_text();
        let len = doc_text.chars().count();
        if len < self.limits.min_chars_text {
            counter!("scoring_rejected_total").increment(1);
            return Err(ScoreError::Validation {
                len,
                min: self.limits.min_chars_text,
            });
        }

        let report = self.engine.score(&doc_text);
        let sentences = self.score_sentences(&article.body);
        let doc_ml = document_ml(&sentences);
        let final_prob = self.blend.blend(report.prob, doc_ml);

        counter!("scoring_articles_total").increment(1);
        dev_log_score("scored", &doc_text, final_prob, &report.flags);

        Ok(ScoredArticle {
            article: article.clone(),
            fake_prob: report.prob,
            ml_prob: doc_ml,
            final_prob: Some(final_prob),
            flags: report.flags,
            sentences: Some(sentences),
        })
    }

    /// Per-sentence heuristic + classifier scores for a body, in document
    /// order. The classifier only sees sentences inside the length window,
    /// and only when enough of them exist (the stability gate); otherwise no
    /// sentence carries an `ml_prob` and every final equals its heuristic.
    pub fn score_sentences(&self, body: &str) -> Vec<SentenceScore> {
        let min = self.limits.ml_sentence_min_chars;
        let max = self.limits.ml_sentence_max_chars;

        let mut scores: Vec<SentenceScore> = Vec::new();
        let mut eligible: Vec<usize> = Vec::new();
        for (index, sentence) in split_sentences(body).enumerate() {
            let chars = sentence.chars().count();
            if (min..=max).contains(&chars) {
                eligible.push(index);
            }
            let heur = self.engine.score(sentence).prob;
            scores.push(SentenceScore {
                text: sentence.to_string(),
                index,
                heur_prob: heur,
                ml_prob: None,
                final_prob: heur,
            });
        }
        counter!("scoring_sentences_total").increment(scores.len() as u64);

        let model = match &self.model {
            Some(m) => m,
            None => return scores,
        };
        if eligible.len() < self.limits.min_sentences_for_ml {
            debug!(
                target: "pipeline",
                eligible = eligible.len(),
                required = self.limits.min_sentences_for_ml,
                "too few classifier-eligible sentences; heuristics only"
            );
            return scores;
        }

        for index in eligible {
            let s = &mut scores[index];
            let ml = model.predict(&s.text).clamp(0.0, 1.0);
            s.ml_prob = Some(ml);
            s.final_prob = self.blend.blend(s.heur_prob, Some(ml));
            counter!("scoring_ml_sentences_total").increment(1);
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FixedModel;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default_embedded()
    }

    const LONG_NEUTRAL: &str = "The council published its annual budget report on Tuesday. \
        According to the finance office, spending rose modestly. Officials said the plan \
        includes reserves for road maintenance. A public session is scheduled for March.";

    #[test]
    fn short_text_is_rejected_with_lengths() {
        let p = ScoringPipeline::heuristics_only(&cfg());
        let err = p.score_text("too short").unwrap_err();
        match err {
            ScoreError::Validation { len, min } => {
                assert_eq!(len, "too short".len());
                assert_eq!(min, 120);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn without_model_final_equals_heuristic_exactly() {
        let p = ScoringPipeline::heuristics_only(&cfg());
        let scored = p.score_text(LONG_NEUTRAL).unwrap();
        assert!(scored.ml_prob.is_none());
        assert_eq!(scored.final_prob, Some(scored.fake_prob));
        for s in scored.sentences.as_deref().unwrap() {
            assert!(s.ml_prob.is_none());
            assert_eq!(s.final_prob, s.heur_prob);
        }
    }

    #[test]
    fn with_model_sentences_and_document_get_ml() {
        let model = ModelHandle::with_model(Arc::new(FixedModel { value: 0.8 }));
        let p = ScoringPipeline::new(&cfg(), &model);
        let scored = p.score_text(LONG_NEUTRAL).unwrap();

        let sentences = scored.sentences.as_deref().unwrap();
        assert!(sentences.len() >= 3);
        for s in sentences {
            assert_eq!(s.ml_prob, Some(0.8));
        }
        assert!((scored.ml_prob.unwrap() - 0.8).abs() < 1e-6);
        // 0.4/0.6 blend of the document heuristic against 0.8
        let expected = 0.4 * scored.fake_prob + 0.6 * 0.8;
        assert!((scored.final_prob.unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn stability_gate_suppresses_ml_entirely() {
        let model = ModelHandle::with_model(Arc::new(FixedModel { value: 0.9 }));
        let p = ScoringPipeline::new(&cfg(), &model);
        // two sentences only, both in the window: below the gate of 3
        let text = "One perfectly ordinary sentence about the town budget. \
            Another perfectly ordinary sentence about local road repairs follows here.";
        assert!(text.len() >= 120);
        let scored = p.score_text(text).unwrap();
        assert!(scored.ml_prob.is_none());
        assert_eq!(scored.final_prob, Some(scored.fake_prob));
        for s in scored.sentences.as_deref().unwrap() {
            assert!(s.ml_prob.is_none());
        }
    }

    #[test]
    fn sentence_breakdown_ranks_the_loaded_sentence_higher() {
        let p = ScoringPipeline::heuristics_only(&cfg());
        let body = "Officials announced a plan. Critics called it a disaster and a scam, scam, scam!";
        let scores = p.score_sentences(body);
        assert_eq!(scores.len(), 2);
        assert!(scores[1].heur_prob > scores[0].heur_prob);
        // breakdown works below the document-level minimum length
        assert!(body.chars().count() < p.limits().min_chars_text);
        assert_eq!(Article::new("", "", body).word_count, 14);
    }

    #[test]
    fn sentences_preserve_document_order() {
        let p = ScoringPipeline::heuristics_only(&cfg());
        let scored = p.score_text(LONG_NEUTRAL).unwrap();
        let sentences = scored.sentences.as_deref().unwrap();
        for (i, s) in sentences.iter().enumerate() {
            assert_eq!(s.index, i);
        }
        assert!(sentences[0].text.starts_with("The council"));
        assert!(sentences.last().unwrap().text.starts_with("A public session"));
    }

    #[test]
    fn document_ml_is_mean_of_sentence_values() {
        let model = ModelHandle::with_model(Arc::new(FixedModel { value: 0.6 }));
        let p = ScoringPipeline::new(&cfg(), &model);
        let scored = p.score_text(LONG_NEUTRAL).unwrap();
        let sentences = scored.sentences.as_deref().unwrap();
        let mean: f32 = sentences.iter().filter_map(|s| s.ml_prob).sum::<f32>()
            / sentences.iter().filter(|s| s.ml_prob.is_some()).count() as f32;
        assert!((scored.ml_prob.unwrap() - mean).abs() < 1e-6);
    }

    #[test]
    fn title_joins_document_text_but_not_sentences() {
        let p = ScoringPipeline::heuristics_only(&cfg());
        let article = Article::new("example.org", "SHOCKING claim about WONDER cure", LONG_NEUTRAL);
        let scored = p.score_article(&article).unwrap();
        // flags come from title + body
        assert!(scored
            .flags
            .iter()
            .any(|f| f.starts_with("sensational terms:")));
        // sentences come from the body alone
        let sentences = scored.sentences.as_deref().unwrap();
        assert!(sentences.iter().all(|s| !s.text.contains("SHOCKING")));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        assert_eq!(anon_hash("abc"), anon_hash("abc"));
        assert_eq!(anon_hash("abc").len(), 12);
        assert_ne!(anon_hash("abc"), anon_hash("abd"));
    }
}
