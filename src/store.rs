// src/store.rs
//! Where scored articles live between runs: a JSON array file in production,
//! a plain vec in tests. The batch enricher only talks to the trait.

use crate::article::ScoredArticle;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ScoredArticle>>;
    async fn save(&self, articles: &[ScoredArticle]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// JSON array on disk. Saves are atomic: tmp file, then rename.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ArticleStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<ScoredArticle>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read article store {}", self.path.display()))?;
        let articles: Vec<ScoredArticle> = serde_json::from_str(&raw)
            .with_context(|| format!("parse article store {}", self.path.display()))?;
        Ok(articles)
    }

    async fn save(&self, articles: &[ScoredArticle]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(articles)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        f.write_all(json.as_bytes())?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename into {}", self.path.display()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

/// In-memory store for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    articles: Mutex<Vec<ScoredArticle>>,
}

impl MemoryStore {
    pub fn new(initial: Vec<ScoredArticle>) -> Self {
        Self {
            articles: Mutex::new(initial),
        }
    }
}

#[async_trait::async_trait]
impl ArticleStore for MemoryStore {
    async fn load(&self) -> Result<Vec<ScoredArticle>> {
        Ok(self.articles.lock().unwrap().clone())
    }

    async fn save(&self, articles: &[ScoredArticle]) -> Result<()> {
        *self.articles.lock().unwrap() = articles.to_vec();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
