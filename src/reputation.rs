// src/reputation.rs
//! Source reputation map: outlet or domain name → reputation weight in
//! `[0.0, 1.0]` (1.0 = strongest editorial standards). The weak-supervision
//! labeler uses it as a corroborating signal: a pseudo-positive coming from a
//! reputable source needs a stronger heuristic score before it counts.
//!
//! Loads from JSON (weights + aliases) with a compiled-in seed as fallback.
//! Lookup is case-insensitive, tolerant of domains ("www.bbc.co.uk"),
//! dashes and punctuation. Fallback order: alias → exact → substring →
//! default weight.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

pub const ENV_REPUTATION_PATH: &str = "SOURCE_REPUTATION_PATH";
pub const DEFAULT_REPUTATION_PATH: &str = "config/source_reputation.json";

#[derive(Debug, Clone, Deserialize)]
pub struct SourceReputation {
    /// Weight when nothing matches (unknown blogs, aggregators).
    #[serde(default = "default_default_weight")]
    pub default_weight: f32,
    #[serde(default)]
    pub weights: HashMap<String, f32>,
    /// Alternative spellings/domains → canonical outlet name.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_default_weight() -> f32 {
    0.50
}

impl SourceReputation {
    /// Load from a JSON file; any problem falls back to the seed map.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let loaded = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<Self>(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        };
        loaded.normalized()
    }

    /// `SOURCE_REPUTATION_PATH`, else the default path, else the seed.
    pub fn load_or_default() -> Self {
        let path = std::env::var(ENV_REPUTATION_PATH)
            .unwrap_or_else(|_| DEFAULT_REPUTATION_PATH.to_string());
        if Path::new(&path).exists() {
            Self::load_from_file(path)
        } else {
            Self::default_seed().normalized()
        }
    }

    /// Reputation for a source string as it appears in scraped records.
    pub fn weight_for(&self, source: &str) -> f32 {
        let s = normalize(source);

        if let Some(canon) = self.aliases.get(&s) {
            if let Some(&w) = self.weights.get(&normalize(canon)) {
                return clamp01(w);
            }
        }
        if let Some(&w) = self.weights.get(&s) {
            return clamp01(w);
        }
        for (k, &w) in &self.weights {
            if s.contains(k.as_str()) {
                return clamp01(w);
            }
        }
        clamp01(self.default_weight)
    }

    /// Compiled-in seed covering wire services, broadsheets and the usual
    /// low-credibility suspects.
    pub(crate) fn default_seed() -> Self {
        let mut weights = HashMap::new();
        let mut aliases = HashMap::new();

        for (k, v) in [
            ("reuters", 0.92),
            ("associated press", 0.92),
            ("bbc", 0.90),
            ("financial times", 0.90),
            ("wall street journal", 0.90),
            ("bloomberg", 0.88),
            ("the economist", 0.88),
            ("new york times", 0.88),
            ("npr", 0.86),
            ("the guardian", 0.86),
            ("washington post", 0.86),
            ("al jazeera", 0.80),
            ("cnn", 0.78),
            ("fox news", 0.70),
            ("new york post", 0.55),
            ("daily mail", 0.45),
            ("the sun", 0.40),
            ("breitbart", 0.30),
            ("rt", 0.25),
            ("infowars", 0.10),
            ("naturalnews", 0.10),
        ] {
            weights.insert(k.to_string(), v);
        }

        for (a, c) in [
            ("ap", "associated press"),
            ("apnews", "associated press"),
            ("ap news", "associated press"),
            ("bbc news", "bbc"),
            ("bbc co uk", "bbc"),
            ("ft", "financial times"),
            ("ft com", "financial times"),
            ("wsj", "wall street journal"),
            ("wsj com", "wall street journal"),
            ("nyt", "new york times"),
            ("nytimes", "new york times"),
            ("nytimes com", "new york times"),
            ("guardian", "the guardian"),
            ("theguardian", "the guardian"),
            ("wapo", "washington post"),
            ("washingtonpost", "washington post"),
            ("aljazeera", "al jazeera"),
            ("foxnews", "fox news"),
            ("nypost", "new york post"),
            ("dailymail", "daily mail"),
            ("thesun", "the sun"),
            ("russia today", "rt"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self {
            default_weight: 0.50,
            weights,
            aliases,
        }
    }

    /// Re-key both maps through `normalize` so file-provided entries match the
    /// normalized lookup keys (e.g. "BBC.co.uk" as a key still works).
    fn normalized(mut self) -> Self {
        self.weights = self
            .weights
            .drain()
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        self.aliases = self
            .aliases
            .drain()
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        self
    }
}

/// Lowercase, strip scheme and "www.", turn separators and dots into single
/// spaces.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();
    for prefix in ["https://", "http://"] {
        if let Some(rest) = out.strip_prefix(prefix) {
            out = rest.to_string();
        }
    }
    if let Some(rest) = out.strip_prefix("www.") {
        out = rest.to_string();
    }
    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }
    out = out.replace(['\n', '\r', '\t', '.', ',', '’', '\''], " ");
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}
