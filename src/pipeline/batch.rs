// src/pipeline/batch.rs
//! Idempotent batch join: load every stored article, re-run the classifier
//! stage over its body, blend against the stored heuristic score, write the
//! whole set back atomically. One bad record never stops the run.

use crate::article::ScoredArticle;
use crate::blend::document_ml;
use crate::error::ScoreError;
use crate::pipeline::{anon_hash, ScoringPipeline};
use crate::store::ArticleStore;
use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("batch_runs_total", "Batch enrichment runs started.");
        describe_counter!("batch_enriched_total", "Articles updated by batch runs.");
        describe_counter!(
            "batch_skipped_total",
            "Articles skipped as structurally unusable."
        );
        describe_counter!(
            "batch_failed_total",
            "Articles abandoned on timeout or task failure."
        );
        describe_gauge!("batch_last_run_ts", "Unix ts when a batch run last finished.");
    });
}

#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    /// Articles scored concurrently.
    pub concurrency: usize,
    /// Per-article budget; an article over budget is abandoned, not retried.
    pub timeout: Option<Duration>,
    /// Re-derive `fake_prob`/`flags` from the stored body instead of
    /// trusting the stored values.
    pub force_heuristics: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: None,
            force_heuristics: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub enriched: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum EnrichFailure {
    Score(ScoreError),
    TimedOut,
    Join(String),
}

/// Enrich every record in the store. Per-record outcomes are all-or-nothing:
/// an article is either fully rewritten with fresh classifier output or left
/// exactly as loaded. Re-running over an already-enriched store is a no-op
/// in content.
pub async fn enrich(
    store: &dyn ArticleStore,
    pipeline: Arc<ScoringPipeline>,
    opts: EnrichOptions,
) -> Result<BatchSummary> {
    ensure_metrics_described();
    counter!("batch_runs_total").increment(1);
    let started = Instant::now();

    let mut articles = store.load().await?;
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut join_set: JoinSet<(usize, Result<ScoredArticle, EnrichFailure>)> = JoinSet::new();

    for (idx, record) in articles.iter().enumerate() {
        let record = record.clone();
        let pipeline = pipeline.clone();
        let semaphore = semaphore.clone();
        let timeout = opts.timeout;
        let force = opts.force_heuristics;
        join_set.spawn(async move {
            // never closed while tasks are in flight
            let _permit = semaphore.acquire_owned().await.expect("semaphore open");
            let work = tokio::task::spawn_blocking(move || enrich_one(&pipeline, record, force));
            let joined = match timeout {
                Some(budget) => match tokio::time::timeout(budget, work).await {
                    Ok(j) => j,
                    Err(_) => return (idx, Err(EnrichFailure::TimedOut)),
                },
                None => work.await,
            };
            match joined {
                Ok(outcome) => (idx, outcome.map_err(EnrichFailure::Score)),
                // a panicking scorer loses one article, not the run
                Err(e) => (idx, Err(EnrichFailure::Join(e.to_string()))),
            }
        });
    }

    let mut summary = BatchSummary {
        total: articles.len(),
        enriched: 0,
        skipped: 0,
        failed: 0,
    };
    while let Some(joined) = join_set.join_next().await {
        let (idx, outcome) = joined?;
        match outcome {
            Ok(enriched) => {
                articles[idx] = enriched;
                summary.enriched += 1;
                counter!("batch_enriched_total").increment(1);
            }
            Err(EnrichFailure::Score(e @ ScoreError::InconsistentState { .. })) => {
                summary.skipped += 1;
                counter!("batch_skipped_total").increment(1);
                warn!(target: "batch", id = %anon_hash(articles[idx].ident()), error = %e, "article skipped");
            }
            Err(EnrichFailure::Score(e)) => {
                summary.failed += 1;
                counter!("batch_failed_total").increment(1);
                warn!(target: "batch", id = %anon_hash(articles[idx].ident()), error = %e, "article failed");
            }
            Err(EnrichFailure::TimedOut) => {
                summary.failed += 1;
                counter!("batch_failed_total").increment(1);
                warn!(target: "batch", id = %anon_hash(articles[idx].ident()), "article timed out");
            }
            Err(EnrichFailure::Join(msg)) => {
                summary.failed += 1;
                counter!("batch_failed_total").increment(1);
                warn!(target: "batch", id = %anon_hash(articles[idx].ident()), error = %msg, "scoring task failed");
            }
        }
    }

    store.save(&articles).await?;
    gauge!("batch_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
    info!(
        target: "batch",
        store = store.name(),
        total = summary.total,
        enriched = summary.enriched,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch enrichment finished"
    );
    Ok(summary)
}

/// Rebuild one record's classifier-side fields from its stored body.
fn enrich_one(
    pipeline: &ScoringPipeline,
    record: ScoredArticle,
    force_heuristics: bool,
) -> Result<ScoredArticle, ScoreError> {
    if record.article.body.trim().is_empty() {
        return Err(ScoreError::inconsistent(record.ident(), "empty body"));
    }
    let mut out = record;
    if force_heuristics {
        let report = pipeline.engine().score(&out.article.document_text());
        out.fake_prob = report.prob;
        out.flags = report.flags;
    }
    let sentences = pipeline.score_sentences(&out.article.body);
    let doc_ml = document_ml(&sentences);
    out.final_prob = Some(pipeline.blend_policy().blend(out.fake_prob, doc_ml));
    out.ml_prob = doc_ml;
    out.sentences = Some(sentences);
    Ok(out)
}
