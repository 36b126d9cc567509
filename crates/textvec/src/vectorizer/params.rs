use std::ops::RangeInclusive;

use super::tokenizer::TokenizerConfig;
use crate::error::{Result, VectorizeError};

/// Row normalization applied after weighting.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Norm {
    /// Divide by the sum of absolute values.
    L1,
    /// Divide by the Euclidean norm.
    #[default]
    L2,
    None,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct VectorizerParams {
    ngram_range: (usize, usize),
    /// Minimum document frequency for filtering vocabulary.
    /// - If `min_df` is in (0.0, 1.0), it's a proportion of documents
    /// - If `min_df` >= 1.0, it's an absolute document count
    min_df: f64,
    /// Maximum document frequency for filtering vocabulary.
    /// - If `max_df` is in (0.0, 1.0], it's a proportion of documents
    /// - If `max_df` > 1.0, it's an absolute document count
    max_df: f64,
    /// Keep only the most frequent terms across the corpus.
    max_features: Option<usize>,
    /// Clamp every non-zero count to 1.
    binary: bool,
    /// Apply sublinear tf scaling: replace term frequency `tf` with `1 + ln(tf)`.
    /// Only the TF-IDF vectorizer reads this.
    sublinear_tf: bool,
    tokenizer: TokenizerConfig,
}

impl VectorizerParams {
    #[must_use]
    pub fn new(ngram_range: impl Into<RangeInclusive<usize>>, min_df: f64, max_df: f64) -> Self {
        let range = ngram_range.into();
        Self {
            ngram_range: (*range.start(), *range.end()),
            min_df,
            max_df,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ngram_range(mut self, ngram_range: impl Into<RangeInclusive<usize>>) -> Self {
        let range = ngram_range.into();
        self.ngram_range = (*range.start(), *range.end());
        self
    }

    #[must_use]
    pub fn with_min_df(mut self, min_df: f64) -> Self {
        self.min_df = min_df;
        self
    }

    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    #[must_use]
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    #[must_use]
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    #[must_use]
    pub fn min_df(&self) -> f64 {
        self.min_df
    }

    #[must_use]
    pub fn max_df(&self) -> f64 {
        self.max_df
    }

    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    #[must_use]
    pub fn binary(&self) -> bool {
        self.binary
    }

    #[must_use]
    pub fn sublinear_tf(&self) -> bool {
        self.sublinear_tf
    }

    #[must_use]
    pub fn tokenizer(&self) -> &TokenizerConfig {
        &self.tokenizer
    }

    pub fn validate(&self) -> Result<()> {
        validate_ngram_range(self.ngram_range)?;
        for (name, value) in [("min_df", self.min_df), ("max_df", self.max_df)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(VectorizeError::InvalidConfiguration(format!(
                    "{name} must be positive (proportion in (0.0, 1.0] or absolute count >= 1.0), got {value}"
                )));
            }
        }
        if self.max_features == Some(0) {
            return Err(VectorizeError::InvalidConfiguration(
                "max_features must be positive when set".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolve `min_df`/`max_df` into inclusive absolute document counts.
    pub(crate) fn df_bounds(&self, n_docs: usize) -> Result<(usize, usize)> {
        let n = n_docs as f64;
        let min_count = if self.min_df < 1.0 {
            (self.min_df * n).ceil() as usize
        } else {
            self.min_df as usize
        };
        let max_count = if self.max_df <= 1.0 {
            (self.max_df * n).floor() as usize
        } else {
            self.max_df as usize
        };
        if n_docs > 0 && max_count < min_count {
            return Err(VectorizeError::InvalidConfiguration(format!(
                "max_df corresponds to {max_count} documents, fewer than min_df ({min_count})"
            )));
        }
        Ok((min_count, max_count))
    }
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            ngram_range: (1, 1),
            min_df: 1.0,
            max_df: 1.0,
            max_features: None,
            binary: false,
            sublinear_tf: false,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl From<((usize, usize), f64, f64)> for VectorizerParams {
    fn from(value: ((usize, usize), f64, f64)) -> Self {
        Self::new(value.0.0..=value.0.1, value.1, value.2)
    }
}

/// IDF weighting and normalization for [`TfidfVectorizer`](super::TfidfVectorizer).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TfidfParams {
    pub norm: Norm,
    /// When false every idf weight is 1.0.
    pub use_idf: bool,
    /// `ln((1 + n) / (1 + df)) + 1` when true, `ln(n / df) + 1` otherwise.
    pub smooth_idf: bool,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            norm: Norm::L2,
            use_idf: true,
            smooth_idf: true,
        }
    }
}

/// Default output width of the hashing vectorizer.
pub const DEFAULT_N_FEATURES: usize = 1 << 20;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashingParams {
    /// Output width. Must be positive.
    pub n_features: usize,
    /// Accumulate +1/-1 depending on the hash's top bit instead of always +1.
    pub alternate_sign: bool,
    pub norm: Norm,
    /// Clamp every non-zero slot to +/-1 before normalization.
    pub binary: bool,
    pub ngram_range: (usize, usize),
    pub seed: u64,
    pub tokenizer: TokenizerConfig,
}

impl HashingParams {
    #[must_use]
    pub fn with_n_features(n_features: usize) -> Self {
        Self {
            n_features,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(VectorizeError::InvalidConfiguration(
                "n_features must be positive".to_owned(),
            ));
        }
        validate_ngram_range(self.ngram_range)
    }
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            n_features: DEFAULT_N_FEATURES,
            alternate_sign: true,
            norm: Norm::L2,
            binary: false,
            ngram_range: (1, 1),
            seed: 0,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

fn validate_ngram_range((min_n, max_n): (usize, usize)) -> Result<()> {
    if min_n == 0 || min_n > max_n {
        return Err(VectorizeError::InvalidConfiguration(format!(
            "ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
        )));
    }
    Ok(())
}
