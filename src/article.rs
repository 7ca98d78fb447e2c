// src/article.rs
//! Article data model shared by the on-demand driver, the batch enricher and
//! the JSON store. `fake_prob` keeps its legacy name so already-scored corpora
//! stay readable; it is always the heuristic document probability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw input record, before any scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: String, // e.g. "bbc.com"
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    pub body: String,
    pub word_count: usize,
}

impl Article {
    /// Build an article from parts, deriving `word_count` from the body.
    pub fn new(source: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        let word_count = count_words(&body);
        Self {
            url: None,
            source: source.into(),
            title: title.into(),
            author: None,
            published: None,
            body,
            word_count,
        }
    }

    /// The text the document-level scorer sees: title and body together.
    pub fn document_text(&self) -> String {
        if self.title.trim().is_empty() {
            self.body.trim().to_string()
        } else {
            format!("{}\n{}", self.title.trim(), self.body.trim())
        }
    }
}

/// Whitespace-delimited token count. This is the record-level `word_count`;
/// the scorer's densities use its own lexical-word notion internally.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// One scored sentence, in document order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceScore {
    pub text: String,
    pub index: usize,
    pub heur_prob: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_prob: Option<f32>,
    pub final_prob: f32,
}

/// Fully scored article as stored and returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    /// Heuristic document probability. The stored name is the legacy one;
    /// records written with the newer `heur_prob` key still deserialize.
    #[serde(alias = "heur_prob")]
    pub fake_prob: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_prob: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_prob: Option<f32>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentences: Option<Vec<SentenceScore>>,
}

impl ScoredArticle {
    /// Stable identity for logs and error reporting: url, else title.
    pub fn ident(&self) -> &str {
        match self.article.url.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => self.article.title.as_str(),
        }
    }

    /// Forward-looking name for the heuristic document probability.
    pub fn heur_prob(&self) -> f32 {
        self.fake_prob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_is_whitespace_tokens() {
        assert_eq!(count_words("one two  three\n\tfour"), 4);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        // punctuation stays glued to its token
        assert_eq!(count_words("a plan. Critics!"), 3);
    }

    #[test]
    fn article_new_derives_word_count() {
        let a = Article::new("example.org", "T", "alpha beta gamma");
        assert_eq!(a.word_count, 3);
        assert!(a.url.is_none());
    }

    #[test]
    fn document_text_joins_title_and_body() {
        let a = Article::new("example.org", "Headline", "Body text.");
        assert_eq!(a.document_text(), "Headline\nBody text.");
        let b = Article::new("example.org", "  ", "Body only.");
        assert_eq!(b.document_text(), "Body only.");
    }

    #[test]
    fn scored_article_roundtrips_with_flattened_fields() {
        let a = Article::new("example.org", "T", "Some body here.");
        let s = ScoredArticle {
            article: a,
            fake_prob: 0.42,
            ml_prob: Some(0.6),
            final_prob: Some(0.53),
            flags: vec!["sensational terms: 1".into()],
            sentences: None,
        };
        let json = serde_json::to_string(&s).unwrap();
        // flattened: article fields sit at the top level of the object
        assert!(json.contains("\"title\":\"T\""));
        assert!(json.contains("\"fake_prob\":0.42"));
        let back: ScoredArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn heur_prob_alias_deserializes() {
        let json = r#"{
            "source": "example.org", "title": "T", "body": "Body.",
            "word_count": 1, "heur_prob": 0.61, "flags": []
        }"#;
        let s: ScoredArticle = serde_json::from_str(json).unwrap();
        assert!((s.fake_prob - 0.61).abs() < 1e-6);
        assert!((s.heur_prob() - 0.61).abs() < 1e-6);
    }

    #[test]
    fn ident_prefers_url() {
        let mut s = ScoredArticle {
            article: Article::new("example.org", "Title", "Body."),
            fake_prob: 0.5,
            ml_prob: None,
            final_prob: None,
            flags: vec![],
            sentences: None,
        };
        assert_eq!(s.ident(), "Title");
        s.article.url = Some("https://example.org/a".into());
        assert_eq!(s.ident(), "https://example.org/a");
    }
}
