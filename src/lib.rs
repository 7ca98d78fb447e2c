// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod article;
pub mod blend;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod labeler;
pub mod reputation;
pub mod sentences;
pub mod store;

// Model subsystem: featurizer, artifact, trainer, runtime handle
pub mod model;

// Inference drivers: on-demand scoring + batch enrichment
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::article::{Article, ScoredArticle, SentenceScore};
pub use crate::error::ScoreError;
pub use crate::pipeline::batch::{enrich, BatchSummary, EnrichOptions};
pub use crate::pipeline::ScoringPipeline;

/// One-shot convenience: build a pipeline from the environment (config file,
/// `MODEL_PATH`) and score a single text. Binaries and embedders that score
/// repeatedly should hold a `ScoringPipeline` instead.
pub fn score_text(text: &str) -> anyhow::Result<ScoredArticle> {
    let pipeline = ScoringPipeline::from_env()?;
    Ok(pipeline.score_text(text)?)
}
