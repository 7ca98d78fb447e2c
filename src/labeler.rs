// src/labeler.rs
//! Weak supervision: pseudo-labels for sentence-classifier training, produced
//! by rules instead of human annotators. A sentence is a pseudo-positive when
//! the loaded-language battery fires, or when its heuristic score clears a
//! cutoff; sources with strong reputations get a higher cutoff so wire-copy
//! quotes don't flood the positive class.

use crate::article::ScoredArticle;
use crate::config::{LabelerConfig, ScoringConfig};
use crate::heuristics::HeuristicEngine;
use crate::reputation::SourceReputation;
use crate::sentences::split_sentences;
use regex::Regex;
use tracing::info;

/// Two or more question marks read as rhetorical stacking.
const RHETORICAL_QUESTION_MARKS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakLabel {
    Clean,
    Biased,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSentence {
    pub text: String,
    pub label: WeakLabel,
}

#[derive(Debug)]
pub struct WeakLabeler {
    cfg: LabelerConfig,
    patterns: Vec<Regex>,
    engine: HeuristicEngine,
    reputation: SourceReputation,
}

impl WeakLabeler {
    pub fn from_config(
        cfg: &ScoringConfig,
        reputation: SourceReputation,
    ) -> anyhow::Result<Self> {
        let patterns = cfg
            .labeler
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| anyhow::anyhow!("labeler pattern `{p}` regex error: {e}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            cfg: cfg.labeler.clone(),
            patterns,
            engine: HeuristicEngine::new(cfg.scorer.clone()),
            reputation,
        })
    }

    /// Pseudo-label one sentence. `None` means too short to train on.
    pub fn label_sentence(&self, sentence: &str, source: &str) -> Option<WeakLabel> {
        let s = sentence.trim();
        if s.chars().count() < self.cfg.min_sentence_chars {
            return None;
        }
        if self.battery_fires(s) {
            return Some(WeakLabel::Biased);
        }
        let heur = self.engine.score(s).prob;
        let cutoff = if self.reputation.weight_for(source) >= self.cfg.reputable_weight {
            self.cfg.reputable_cutoff
        } else {
            self.cfg.positive_cutoff
        };
        Some(if heur >= cutoff {
            WeakLabel::Biased
        } else {
            WeakLabel::Clean
        })
    }

    fn battery_fires(&self, s: &str) -> bool {
        let tl = s.to_lowercase();
        if self
            .cfg
            .loaded_language
            .iter()
            .any(|kw| tl.contains(kw.as_str()))
        {
            return true;
        }
        if self.patterns.iter().any(|p| p.is_match(s)) {
            return true;
        }
        tl.matches('?').count() >= RHETORICAL_QUESTION_MARKS
    }

    /// Split bodies, label every trainable sentence, then rebalance the
    /// classes. Deterministic for a given (config, seed).
    pub fn build_training_set(
        &self,
        articles: &[ScoredArticle],
        seed: u64,
    ) -> Vec<LabeledSentence> {
        let mut set = Vec::new();
        for a in articles {
            for s in split_sentences(&a.article.body) {
                if let Some(label) = self.label_sentence(s, &a.article.source) {
                    set.push(LabeledSentence {
                        text: s.to_string(),
                        label,
                    });
                }
            }
        }
        let total = set.len();
        let positives = set.iter().filter(|l| l.label == WeakLabel::Biased).count();
        let balanced = balance(set, self.cfg.max_negative_ratio, seed);
        info!(
            target: "labeler",
            total,
            positives,
            kept = balanced.len(),
            "weak labeling done"
        );
        balanced
    }
}

/// Downsample negatives to at most `max_ratio` × positives, keeping document
/// order. Positives are never dropped. Seeded shuffle keeps runs reproducible.
fn balance(set: Vec<LabeledSentence>, max_ratio: f32, seed: u64) -> Vec<LabeledSentence> {
    let pos = set.iter().filter(|l| l.label == WeakLabel::Biased).count();
    let mut neg_idx: Vec<usize> = set
        .iter()
        .enumerate()
        .filter(|(_, l)| l.label == WeakLabel::Clean)
        .map(|(i, _)| i)
        .collect();
    if pos == 0 || neg_idx.is_empty() {
        return set;
    }
    let max_negs = (max_ratio * pos as f32) as usize;
    if neg_idx.len() <= max_negs {
        return set;
    }

    let mut rng = Lcg::new(seed);
    for i in (1..neg_idx.len()).rev() {
        let j = rng.next_usize(i + 1);
        neg_idx.swap(i, j);
    }
    neg_idx.truncate(max_negs);
    let keep: std::collections::HashSet<usize> = neg_idx.into_iter().collect();

    set.into_iter()
        .enumerate()
        .filter(|(i, l)| l.label == WeakLabel::Biased || keep.contains(i))
        .map(|(_, l)| l)
        .collect()
}

/// Deterministic pseudo-RNG (LCG); training must reproduce bit-for-bit, so no
/// process-seeded randomness here.
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn next_usize(&mut self, n: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 32) as usize) % n.max(1)
    }
}
