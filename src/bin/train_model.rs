//! Train the sentence classifier from a stored article corpus: weak-label
//! every body sentence, balance, fit, write the artifact atomically.
//!
//! Usage: train-model <store.json> [artifact-out.json]

use anyhow::{Context, Result};
use news_credibility_engine::config::ScoringConfig;
use news_credibility_engine::labeler::WeakLabeler;
use news_credibility_engine::model::trainer::{self, TRAINING_SEED};
use news_credibility_engine::model::DEFAULT_MODEL_PATH;
use news_credibility_engine::reputation::SourceReputation;
use news_credibility_engine::store::{ArticleStore, JsonFileStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let store_path = args
        .next()
        .context("usage: train-model <store.json> [artifact-out.json]")?;
    let out_path = args.next().unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

    let cfg = ScoringConfig::load()?;
    let labeler = WeakLabeler::from_config(&cfg, SourceReputation::load_or_default())?;

    let store = JsonFileStore::new(&store_path);
    let articles = store.load().await?;
    let labeled = labeler.build_training_set(&articles, TRAINING_SEED);

    let report = trainer::train(&labeled, TRAINING_SEED)?;
    report
        .artifact
        .save(&out_path)
        .with_context(|| format!("write model artifact to {out_path}"))?;

    println!(
        "trained on {} sentences ({} biased), validation accuracy {:.3}; artifact at {}",
        report.trained, report.positives, report.accuracy, out_path
    );
    Ok(())
}
