//! Run batch enrichment over a stored corpus. Unlike on-demand scoring, a
//! missing classifier artifact is fatal here: enrichment without a model
//! would only rewrite what is already stored.
//!
//! Usage: batch-enrich <store.json> [--force-heuristics]

use anyhow::{bail, Context, Result};
use news_credibility_engine::config::ScoringConfig;
use news_credibility_engine::model::ModelHandle;
use news_credibility_engine::pipeline::batch::{enrich, EnrichOptions};
use news_credibility_engine::store::JsonFileStore;
use news_credibility_engine::ScoringPipeline;
use std::sync::Arc;
use std::time::Duration;
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

    let mut store_path: Option<String> = None;
    let mut force_heuristics = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--force-heuristics" => force_heuristics = true,
            other if store_path.is_none() => store_path = Some(other.to_string()),
            other => bail!("unexpected argument: {other}"),
        }
    }
    let store_path =
        store_path.context("usage: batch-enrich <store.json> [--force-heuristics]")?;

    let handle = ModelHandle::from_env();
    handle.require()?;

    let cfg = ScoringConfig::load()?;
    let pipeline = Arc::new(ScoringPipeline::new(&cfg, &handle));
    let store = JsonFileStore::new(&store_path);

    let summary = enrich(
        &store,
        pipeline,
        EnrichOptions {
            timeout: Some(Duration::from_secs(30)),
            force_heuristics,
            ..EnrichOptions::default()
        },
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
