// tests/pipeline_on_demand.rs
// End-to-end behavior of the on-demand driver: validation, degradation,
// classifier wiring and blend arithmetic, output shape.

use news_credibility_engine::config::ScoringConfig;
use news_credibility_engine::model::{FixedModel, ModelHandle};
use news_credibility_engine::{Article, ScoreError, ScoringPipeline};
use std::sync::Arc;

const CLICKBAIT: &str = "SHOCKING bombshell rocks the city council tonight!!! \
    Insiders say the EXPOSED memo proves a massive cover-up scandal. \
    You won't believe what the committee tried to hide from voters. \
    Share this before it is DELETED forever!";

const WIRE_COPY: &str = "According to the city auditor's report, council spending rose \
    4 percent last year. Officials said the increase reflects road repairs. \
    \u{201c}The dataset is public,\u{201d} a spokesperson said. A follow-up analysis is planned.";

fn heuristics_only() -> ScoringPipeline {
    ScoringPipeline::heuristics_only(&ScoringConfig::default_embedded())
}

fn with_fixed_model(value: f32) -> ScoringPipeline {
    let handle = ModelHandle::with_model(Arc::new(FixedModel { value }));
    ScoringPipeline::new(&ScoringConfig::default_embedded(), &handle)
}

#[test]
fn short_input_is_a_validation_error() {
    let pipeline = heuristics_only();
    let err = pipeline.score_text("Brief note.").unwrap_err();
    assert!(matches!(err, ScoreError::Validation { .. }));
    assert!(err.to_string().contains("minimum 120"));
}

#[test]
fn clickbait_scores_high_and_wire_copy_scores_low() {
    let pipeline = heuristics_only();
    let loud = pipeline.score_text(CLICKBAIT).unwrap();
    let sober = pipeline.score_text(WIRE_COPY).unwrap();

    assert!(loud.fake_prob > 0.9, "clickbait scored {}", loud.fake_prob);
    assert!(sober.fake_prob < 0.15, "wire copy scored {}", sober.fake_prob);
    for p in [loud.fake_prob, sober.fake_prob] {
        assert!((0.01..=0.98).contains(&p));
    }

    assert!(loud.flags[0].starts_with("sensational terms:"));
    assert!(loud.flags.contains(&"exclamation marks: 4".to_string()));
    assert!(loud.flags.iter().any(|f| f.starts_with("ALL-CAPS ratio:")));
    assert_eq!(sober.flags, vec!["credibility cues present".to_string()]);
}

#[test]
fn without_model_final_is_the_heuristic_bit_for_bit() {
    let pipeline = heuristics_only();
    let scored = pipeline.score_text(CLICKBAIT).unwrap();
    assert!(scored.ml_prob.is_none());
    assert_eq!(scored.final_prob, Some(scored.fake_prob));
    for s in scored.sentences.as_deref().unwrap() {
        assert!(s.ml_prob.is_none());
        assert_eq!(s.final_prob, s.heur_prob);
    }
}

#[test]
fn fixed_model_blends_at_forty_sixty() {
    let pipeline = with_fixed_model(0.5);
    let scored = pipeline.score_text(WIRE_COPY).unwrap();
    assert_eq!(scored.ml_prob, Some(0.5));
    let expected = 0.4 * scored.fake_prob + 0.6 * 0.5;
    assert!((scored.final_prob.unwrap() - expected).abs() < 1e-6);
}

#[test]
fn oversized_sentences_stay_outside_the_ml_window() {
    let pipeline = with_fixed_model(0.5);
    // three ordinary sentences, then a 700+ char run-on with no terminator
    let run_on = "the committee continued deliberating without a recorded vote, ".repeat(12);
    let text = format!(
        "The council met on Tuesday to review the budget. \
         Spending rose modestly according to the auditor. \
         Officials said repairs begin in June. {run_on}"
    );
    let scored = pipeline.score_text(&text).unwrap();
    let sentences = scored.sentences.as_deref().unwrap();
    assert_eq!(sentences.len(), 4);
    assert!(sentences[0].ml_prob.is_some());
    assert!(sentences[1].ml_prob.is_some());
    assert!(sentences[2].ml_prob.is_some());
    // the run-on exceeds the window; heuristic only
    assert!(sentences[3].ml_prob.is_none());
    assert_eq!(sentences[3].final_prob, sentences[3].heur_prob);
    assert!((scored.ml_prob.unwrap() - 0.5).abs() < 1e-6);
}

#[test]
fn two_eligible_sentences_skip_the_classifier() {
    let pipeline = with_fixed_model(0.9);
    let text = "One perfectly ordinary sentence about the annual town budget. \
        Another perfectly ordinary sentence about scheduled road repairs downtown.";
    let scored = pipeline.score_text(text).unwrap();
    assert_eq!(scored.sentences.as_deref().unwrap().len(), 2);
    assert!(scored.ml_prob.is_none());
    assert_eq!(scored.final_prob, Some(scored.fake_prob));
}

#[test]
fn structured_articles_score_title_plus_body() {
    let pipeline = heuristics_only();
    let article = Article::new("daily-buzz.example", "SHOCKING scandal EXPOSED in city hall", WIRE_COPY);
    let scored = pipeline.score_article(&article).unwrap();
    // title pushes sensational flags in even over a sober body
    assert!(scored.flags.iter().any(|f| f.starts_with("sensational terms:")));
    assert_eq!(scored.article.source, "daily-buzz.example");
    // sentence list still comes from the body
    let sentences = scored.sentences.as_deref().unwrap();
    assert!(sentences.iter().all(|s| !s.text.contains("SHOCKING")));
}

#[test]
fn scored_json_shape_is_stable() {
    let pipeline = with_fixed_model(0.25);
    let scored = pipeline.score_text(WIRE_COPY).unwrap();
    let v: serde_json::Value = serde_json::to_value(&scored).unwrap();

    // article fields are flattened to the top level
    assert!(v.get("body").is_some());
    assert!(v.get("word_count").is_some());
    assert!(v.get("fake_prob").is_some());
    assert!(v.get("ml_prob").is_some());
    assert!(v.get("final_prob").is_some());
    assert!(v["flags"].is_array());
    let sentences = v["sentences"].as_array().unwrap();
    assert_eq!(sentences[0]["index"], 0);
    assert!(sentences[0].get("heur_prob").is_some());
}

#[test]
fn repeated_runs_are_identical() {
    let pipeline = with_fixed_model(0.5);
    let a = pipeline.score_text(CLICKBAIT).unwrap();
    let b = pipeline.score_text(CLICKBAIT).unwrap();
    assert_eq!(a, b);
}
