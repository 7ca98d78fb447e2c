// src/model/features.rs
//! Feature extraction shared verbatim by the trainer and the inference path.
//! Hashed bag of unigrams and bigrams plus a handful of structural signals.
//! Hashing is FNV-1a rather than `DefaultHasher` because trained artifacts
//! outlive the process that wrote them; the hash must be identical across
//! platforms and std versions.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Identifier stored in artifacts; bump together with `ARTIFACT_VERSION`
/// whenever the feature layout changes.
pub const FEATURIZER_ID: &str = "fnv1a-uni-bi-v1";

pub const HASHED_DIMS: usize = 4096;
pub const STRUCTURAL_DIMS: usize = 6;
pub const TOTAL_DIMS: usize = HASHED_DIMS + STRUCTURAL_DIMS;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9][a-z0-9'-]*").expect("valid token regex"));

/// Sparse feature vector: (dimension, value) pairs, dimensions strictly
/// ascending, every value finite. Hashed dims are L2-normalized so sentence
/// length does not dominate; structural dims are bounded in [0,1].
pub fn featurize(sentence: &str) -> Vec<(u32, f32)> {
    let lower = sentence.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE.find_iter(&lower).map(|m| m.as_str()).collect();

    let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
    for t in &tokens {
        let dim = (fnv1a64(format!("u:{t}").as_bytes()) % HASHED_DIMS as u64) as u32;
        *counts.entry(dim).or_insert(0.0) += 1.0;
    }
    for pair in tokens.windows(2) {
        let dim =
            (fnv1a64(format!("b:{} {}", pair[0], pair[1]).as_bytes()) % HASHED_DIMS as u64) as u32;
        *counts.entry(dim).or_insert(0.0) += 1.0;
    }

    let norm = counts.values().map(|v| v * v).sum::<f32>().sqrt();
    let mut out: Vec<(u32, f32)> = if norm > 0.0 {
        counts.into_iter().map(|(d, v)| (d, v / norm)).collect()
    } else {
        Vec::new()
    };

    for (offset, value) in structural(sentence).into_iter().enumerate() {
        if value > 0.0 {
            out.push(((HASHED_DIMS + offset) as u32, value));
        }
    }
    out
}

/// Structural signals in [0,1]: exclamations, questions, shouting, quoted
/// speech, length, digit presence.
fn structural(sentence: &str) -> [f32; STRUCTURAL_DIMS] {
    let excl = sentence.matches('!').count();
    let q = sentence.matches('?').count();
    let caps_words = sentence
        .split_whitespace()
        .filter(|w| {
            let caps = w.chars().filter(|c| c.is_ascii_uppercase()).count();
            caps >= 4 && !w.chars().any(|c| c.is_ascii_lowercase())
        })
        .count();
    let quotes = ['"', '\u{201c}', '\u{201d}']
        .iter()
        .map(|c| sentence.matches(*c).count())
        .sum::<usize>();
    let digits = sentence
        .split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
        .count();

    [
        (excl as f32 / 3.0).min(1.0),
        (q as f32 / 3.0).min(1.0),
        (caps_words as f32 / 4.0).min(1.0),
        if quotes >= 2 { 1.0 } else { 0.0 },
        (sentence.chars().count() as f32 / 300.0).min(1.0),
        (digits as f32 / 4.0).min(1.0),
    ]
}

/// FNV-1a, 64-bit. Stable by construction; do not swap for `DefaultHasher`.
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}
