use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use textvec::{CountVectorizer, CsMat, IdfTable, TfidfVectorizer, Vocabulary};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// Raw term counts
    Count,
    /// Counts weighted by inverse document frequency, then normalized (default)
    Tfidf,
}

/// A fitted vectorizer as stored in a model file.
#[derive(Debug, Serialize, Deserialize)]
pub enum FittedModel {
    Count(CountVectorizer),
    Tfidf(TfidfVectorizer),
}

impl FittedModel {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        textvec::persist::from_bytes(&bytes)
            .with_context(|| format!("Failed to decode model file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = textvec::persist::to_bytes(self).context("Failed to encode model")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write model file: {}", path.display()))
    }

    pub fn transform(&self, texts: &[String]) -> textvec::Result<CsMat<f64>> {
        match self {
            Self::Count(vectorizer) => vectorizer.transform(texts),
            Self::Tfidf(vectorizer) => vectorizer.transform(texts),
        }
    }

    pub fn vocabulary(&self) -> textvec::Result<&Vocabulary> {
        match self {
            Self::Count(vectorizer) => vectorizer.vocabulary(),
            Self::Tfidf(vectorizer) => vectorizer.vocabulary(),
        }
    }

    /// Idf weights, for tf-idf models only.
    pub fn idf(&self) -> Option<&IdfTable> {
        match self {
            Self::Count(_) => None,
            Self::Tfidf(vectorizer) => vectorizer.idf().ok(),
        }
    }

    pub fn num_features(&self) -> Option<usize> {
        match self {
            Self::Count(vectorizer) => vectorizer.num_features(),
            Self::Tfidf(vectorizer) => vectorizer.num_features(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Count(_) => ModelKind::Count,
            Self::Tfidf(_) => ModelKind::Tfidf,
        }
    }
}
