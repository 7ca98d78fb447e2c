// src/model/trainer.rs
//! SGD logistic regression over weakly labeled sentences. Deterministic for
//! a fixed seed: featurization, shuffling, and the update order all derive
//! from the seed, so retraining on the same corpus reproduces the artifact.

use crate::labeler::{LabeledSentence, Lcg, WeakLabel};
use crate::model::artifact::{ModelArtifact, ARTIFACT_VERSION};
use crate::model::features::{featurize, FEATURIZER_ID, TOTAL_DIMS};
use anyhow::{bail, Result};
use chrono::Utc;
use tracing::info;

/// Default seed; keep stable so published artifacts are reproducible.
pub const TRAINING_SEED: u64 = 42;
/// Refuse to train on less than this; the model would memorize noise.
pub const MIN_TRAINING_SENTENCES: usize = 200;

const EPOCHS: usize = 30;
const BASE_LR: f32 = 0.25;
const L2: f32 = 1e-4;
const VALIDATION_SHARE: f32 = 0.2;

#[derive(Debug)]
pub struct TrainReport {
    pub trained: usize,
    pub validation: usize,
    pub positives: usize,
    pub accuracy: f32,
    pub artifact: ModelArtifact,
}

pub fn train(examples: &[LabeledSentence], seed: u64) -> Result<TrainReport> {
    if examples.len() < MIN_TRAINING_SENTENCES {
        bail!(
            "need at least {MIN_TRAINING_SENTENCES} labeled sentences to train, got {}",
            examples.len()
        );
    }

    let mut data: Vec<(Vec<(u32, f32)>, f32)> = examples
        .iter()
        .map(|ex| {
            let y = match ex.label {
                WeakLabel::Biased => 1.0,
                WeakLabel::Clean => 0.0,
            };
            (featurize(&ex.text), y)
        })
        .collect();

    let mut rng = Lcg::new(seed);
    for i in (1..data.len()).rev() {
        let j = rng.next_usize(i + 1);
        data.swap(i, j);
    }

    let val_len = ((data.len() as f32) * VALIDATION_SHARE) as usize;
    let val_len = val_len.clamp(1, data.len() - 1);
    let (train_set, val_set) = data.split_at(data.len() - val_len);

    let pos = train_set.iter().filter(|(_, y)| *y > 0.5).count();
    let neg = train_set.len() - pos;
    if pos == 0 || neg == 0 {
        bail!("training set needs both classes ({pos} biased, {neg} clean)");
    }
    // counter class imbalance: each class contributes half the total gradient
    let w_pos = train_set.len() as f32 / (2.0 * pos as f32);
    let w_neg = train_set.len() as f32 / (2.0 * neg as f32);

    let mut weights = vec![0.0f32; TOTAL_DIMS];
    let mut bias = 0.0f32;
    let mut order: Vec<usize> = (0..train_set.len()).collect();

    for epoch in 0..EPOCHS {
        let lr = BASE_LR / (1.0 + 0.05 * epoch as f32);
        for i in (1..order.len()).rev() {
            let j = rng.next_usize(i + 1);
            order.swap(i, j);
        }
        for &idx in &order {
            let (fv, y) = &train_set[idx];
            let mut z = bias;
            for (dim, value) in fv {
                z += weights[*dim as usize] * value;
            }
            let p = sigmoid(z);
            let class_w = if *y > 0.5 { w_pos } else { w_neg };
            let g = (p - y) * class_w;
            for (dim, value) in fv {
                let w = &mut weights[*dim as usize];
                *w -= lr * (g * value + L2 * *w);
            }
            bias -= lr * g;
        }
    }

    let mut correct = 0usize;
    for (fv, y) in val_set {
        let mut z = bias;
        for (dim, value) in fv {
            z += weights[*dim as usize] * value;
        }
        let predicted = if sigmoid(z) >= 0.5 { 1.0 } else { 0.0 };
        if (predicted - y).abs() < 0.5 {
            correct += 1;
        }
    }
    let accuracy = correct as f32 / val_set.len() as f32;

    let positives = examples
        .iter()
        .filter(|ex| ex.label == WeakLabel::Biased)
        .count();
    let artifact = ModelArtifact {
        version: ARTIFACT_VERSION,
        created_at: Utc::now(),
        featurizer: FEATURIZER_ID.to_string(),
        feature_dims: TOTAL_DIMS,
        weights,
        bias,
        trained_sentences: train_set.len(),
        positive_share: positives as f32 / examples.len() as f32,
        validation_accuracy: accuracy,
    };

    info!(
        target: "trainer",
        trained = train_set.len(),
        validation = val_set.len(),
        positives,
        accuracy,
        "sentence model trained"
    );

    Ok(TrainReport {
        trained: train_set.len(),
        validation: val_set.len(),
        positives,
        accuracy,
        artifact,
    })
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::LinearSentenceModel;
    use crate::model::SentenceModel;

    fn synthetic_corpus() -> Vec<LabeledSentence> {
        let subjects = [
            "The council",
            "The ministry",
            "The committee",
            "The regulator",
            "The agency",
            "The board",
        ];
        let biased_middles = [
            "is obviously lying about the budget",
            "shamelessly betrayed the voters",
            "has always ignored the crisis",
            "is covering up the scandal",
            "never cared about ordinary people",
        ];
        let biased_tails = [
            "and everyone knows it!!!",
            "which is an absolute disgrace!",
            "while the corrupt elites profit!",
            "in a shocking betrayal!",
            "and only idiots deny it!",
            "so wake up before it is too late!",
        ];
        let clean_middles = [
            "published the quarterly report on",
            "reviewed the infrastructure plan on",
            "approved the transit schedule on",
            "summarized the water quality figures on",
            "audited the pension accounts on",
        ];
        let clean_tails = [
            "Tuesday morning.",
            "the first of March.",
            "Thursday afternoon.",
            "the last day of the quarter.",
            "Friday before the recess.",
            "Monday as planned.",
        ];

        let mut out = Vec::new();
        for s in subjects {
            for m in biased_middles {
                for t in biased_tails {
                    out.push(LabeledSentence {
                        text: format!("{s} {m} {t}"),
                        label: WeakLabel::Biased,
                    });
                }
            }
            for m in clean_middles {
                for t in clean_tails {
                    out.push(LabeledSentence {
                        text: format!("{s} {m} {t}"),
                        label: WeakLabel::Clean,
                    });
                }
            }
        }
        out
    }

    #[test]
    fn refuses_tiny_corpora() {
        let few: Vec<LabeledSentence> = synthetic_corpus().into_iter().take(50).collect();
        let err = train(&few, TRAINING_SEED).unwrap_err();
        assert!(err.to_string().contains("at least"));
    }

    #[test]
    fn refuses_single_class_corpora() {
        let clean_only: Vec<LabeledSentence> = synthetic_corpus()
            .into_iter()
            .map(|mut ex| {
                ex.label = WeakLabel::Clean;
                ex
            })
            .collect();
        assert!(clean_only.len() >= MIN_TRAINING_SENTENCES);
        let err = train(&clean_only, TRAINING_SEED).unwrap_err();
        assert!(err.to_string().contains("both classes"));
    }

    #[test]
    fn separates_loaded_from_neutral_sentences() {
        let corpus = synthetic_corpus();
        assert!(corpus.len() >= 300);
        let report = train(&corpus, TRAINING_SEED).unwrap();
        assert!(
            report.accuracy >= 0.8,
            "validation accuracy {} too low",
            report.accuracy
        );

        let model = LinearSentenceModel::new(report.artifact);
        // held-out phrasings, same vocabulary
        let loaded = model.predict("Everyone knows the corrupt board is lying, an absolute disgrace!!!");
        let neutral = model.predict("The committee published the pension figures on Wednesday morning.");
        assert!(
            loaded > neutral,
            "loaded {loaded} should exceed neutral {neutral}"
        );
        assert!(loaded > 0.5, "loaded sentence scored {loaded}");
        assert!(neutral < 0.5, "neutral sentence scored {neutral}");
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let corpus = synthetic_corpus();
        let a = train(&corpus, TRAINING_SEED).unwrap();
        let b = train(&corpus, TRAINING_SEED).unwrap();
        assert_eq!(a.artifact.weights, b.artifact.weights);
        assert!((a.artifact.bias - b.artifact.bias).abs() < f32::EPSILON);
        assert!((a.accuracy - b.accuracy).abs() < f32::EPSILON);
    }
}
