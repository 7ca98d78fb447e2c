// src/heuristics.rs
//! Lexical credibility heuristics. A fixed battery of rules turns surface
//! signals (sensational vocabulary, punctuation, capitalization, uncited
//! figures, attribution cues) into a signed accumulator, squashed through a
//! logistic into a probability with a floor and a ceiling. Pure function of
//! (text, config): same input, same score, same flags, in the same order.
//!
//! The same scorer runs on whole documents and on single sentences; densities
//! are normalized per lexical word so the battery behaves at both sizes.

use crate::config::ScorerConfig;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lexical words for density denominators: alphabetic tokens of 3+ chars.
/// Distinct from the record-level whitespace `word_count` on purpose.
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'-]{2,}").expect("valid word regex"));

static ALL_CAPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{4,}\b").expect("valid all-caps regex"));

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d[\d,.]*%?").expect("valid numeric regex"));

// Flag thresholds: flags report observed magnitudes, so they compare against
// raw counts/densities, not the capped values that feed the accumulator.
const FLAG_EXCLAMATIONS_OVER: usize = 2;
const FLAG_QUESTIONS_OVER: usize = 4;
const FLAG_ALL_CAPS_RATIO_OVER: f32 = 0.02;
const FLAG_CREDIBILITY_DENSITY_MIN: f32 = 0.5;
/// Fewer figures than this never count as "uncited".
const UNCITED_MIN_FIGURES: usize = 3;
/// Two or more quote characters read as quoted speech, i.e. attribution.
const QUOTED_SPEECH_MIN_QUOTES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicReport {
    /// Probability that the text is unreliable, in [floor, ceiling].
    pub prob: f32,
    /// Human-readable rule flags, in fixed battery order.
    pub flags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    cfg: ScorerConfig,
}

impl HeuristicEngine {
    pub fn new(cfg: ScorerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.cfg
    }

    /// Score a document or a single sentence.
    pub fn score(&self, text: &str) -> HeuristicReport {
        let text = text.trim();
        let lower = text.to_lowercase();
        let w = &self.cfg.weights;
        let caps = &self.cfg.caps;
        let lex = &self.cfg.lexicons;

        let n = WORD_RE.find_iter(text).count();
        let nf = n as f32;

        let excl = text.matches('!').count();
        let q = text.matches('?').count();
        let all_caps = ALL_CAPS_RE
            .find_iter(text)
            .filter(|m| !lex.acronym_allowlist.iter().any(|a| a == m.as_str()))
            .count();
        let sens_hits = distinct_hits(&lower, &lex.sensational) + distinct_hits(&lower, &lex.clickbait);
        let quote_chars = ['"', '\u{201c}', '\u{201d}']
            .iter()
            .map(|c| text.matches(*c).count())
            .sum::<usize>();
        let cred_hits = distinct_hits(&lower, &lex.credibility)
            + usize::from(quote_chars >= QUOTED_SPEECH_MIN_QUOTES);
        let figures = NUMERIC_RE.find_iter(text).count();
        let uncited = if cred_hits == 0 && figures >= UNCITED_MIN_FIGURES {
            figures
        } else {
            0
        };

        let all_caps_ratio = if n > 0 { all_caps as f32 / nf } else { 0.0 };
        let sens_density = sens_hits as f32 / (nf / 250.0).max(1.0);
        let excl_norm = (excl as f32 / 8.0).min(1.0);
        let q_norm = (q as f32 / 12.0).min(1.0);
        let uncited_density = uncited as f32 / (nf / 200.0).max(1.0);
        let cred_density = cred_hits as f32 / (nf / 400.0).max(1.0);

        let raw = w.sensational * sens_density.min(caps.sensational_density)
            + w.exclamations * excl_norm
            + w.questions * q_norm
            + w.all_caps * all_caps_ratio.min(caps.all_caps_ratio)
            + w.uncited_figures * uncited_density.min(caps.uncited_density)
            - w.credibility * cred_density.min(caps.credibility_density);

        let prob = sigmoid(raw).clamp(self.cfg.prob_floor, self.cfg.prob_ceiling);

        // Battery order is the flag order; equal inputs give equal lists.
        let mut flags = Vec::new();
        if sens_hits > 0 {
            flags.push(format!("sensational terms: {sens_hits}"));
        }
        if excl > FLAG_EXCLAMATIONS_OVER {
            flags.push(format!("exclamation marks: {excl}"));
        }
        if q > FLAG_QUESTIONS_OVER {
            flags.push(format!("question marks: {q}"));
        }
        if all_caps_ratio > FLAG_ALL_CAPS_RATIO_OVER {
            flags.push(format!("ALL-CAPS ratio: {:.2}%", all_caps_ratio * 100.0));
        }
        if uncited > 0 {
            flags.push(format!("uncited figures: {uncited}"));
        }
        if cred_density >= FLAG_CREDIBILITY_DENSITY_MIN {
            flags.push("credibility cues present".to_string());
        }

        HeuristicReport { prob, flags }
    }
}

/// How many lexicon terms occur in `lower` at least once. Distinct terms, not
/// occurrences, so a repeated smear word counts once.
fn distinct_hits(lower: &str, terms: &[String]) -> usize {
    terms.iter().filter(|t| lower.contains(t.as_str())).count()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
