//! Score a text file (or stdin) on demand and print the scored article as
//! JSON. Works heuristics-only when no model artifact is present.
//!
//! Usage: score-file [path]   (reads stdin when no path or "-" is given)

use anyhow::{Context, Result};
use news_credibility_engine::ScoringPipeline;
use std::io::Read;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let arg = std::env::args().nth(1);
    let text = match arg.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("read {path}"))?,
    };

    let pipeline = ScoringPipeline::from_env()?;
    let scored = pipeline.score_text(&text)?;
    println!("{}", serde_json::to_string_pretty(&scored)?);
    Ok(())
}
