use std::borrow::Cow;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::error::{Result, VectorizeError};

/// Default pattern: runs of two or more word characters on word boundaries.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Minimum number of texts to consider parallelization
#[cfg(feature = "parallel")]
const MIN_TEXTS_FOR_PARALLEL: usize = 100;

/// Minimum total character count to consider parallelization
#[cfg(feature = "parallel")]
const MIN_CHARS_FOR_PARALLEL: usize = 10_000;

/// Tokenization policy shared by every vectorizer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Regex whose matches become tokens.
    pub token_pattern: String,
    /// Lower-case the text before matching.
    pub lowercase: bool,
    /// Tokens shorter than this many chars are dropped. Must be at least 1.
    pub min_token_len: usize,
    /// Drop tokens made only of numeric chars.
    pub drop_numeric: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_owned(),
            lowercase: true,
            min_token_len: 2,
            drop_numeric: true,
        }
    }
}

/// Compiled form of [`TokenizerConfig`]. Serializes as its config.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "TokenizerConfig", into = "TokenizerConfig")
)]
#[derive(Clone, Debug)]
pub struct Tokenizer {
    config: TokenizerConfig,
    pattern: Regex,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        if config.min_token_len == 0 {
            return Err(VectorizeError::InvalidConfiguration(
                "min_token_len must be at least 1".to_owned(),
            ));
        }
        let pattern = Regex::new(&config.token_pattern).map_err(|e| {
            VectorizeError::InvalidConfiguration(format!(
                "invalid token_pattern {:?}: {e}",
                config.token_pattern
            ))
        })?;
        Ok(Self { config, pattern })
    }

    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Split one document into tokens, in order of appearance.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.config.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };
        self.pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| self.keep(token))
            .map(str::to_owned)
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        if token.chars().count() < self.config.min_token_len {
            return false;
        }
        !(self.config.drop_numeric && token.chars().all(char::is_numeric))
    }

    /// Tokenize every document. Runs on the rayon pool for large batches
    /// when the `parallel` feature is enabled.
    pub fn tokenize_batch<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<Vec<String>> {
        #[cfg(feature = "parallel")]
        {
            if should_use_parallel(texts) {
                return self.tokenize_texts_par(texts);
            }
        }
        self.tokenize_texts(texts)
    }

    #[cfg(feature = "parallel")]
    fn tokenize_texts_par<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<Vec<String>> {
        debug!(num_texts = texts.len(), "Using parallel tokenization");
        texts
            .par_iter()
            .map(|text| self.tokenize(text.as_ref()))
            .collect()
    }

    fn tokenize_texts<T: AsRef<str>>(&self, texts: &[T]) -> Vec<Vec<String>> {
        debug!(num_texts = texts.len(), "Using sequential tokenization");
        texts
            .iter()
            .map(|text| self.tokenize(text.as_ref()))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern is valid"),
            config: TokenizerConfig::default(),
        }
    }
}

impl PartialEq for Tokenizer {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl TryFrom<TokenizerConfig> for Tokenizer {
    type Error = VectorizeError;

    fn try_from(config: TokenizerConfig) -> Result<Self> {
        Self::new(config)
    }
}

impl From<Tokenizer> for TokenizerConfig {
    fn from(tokenizer: Tokenizer) -> Self {
        tokenizer.config
    }
}

/// Determine if parallel processing should be used based on workload characteristics.
///
/// Parallelization is beneficial when:
/// - There are many texts (>= 100), OR
/// - The total character count is large (>= 10,000 chars)
#[cfg(feature = "parallel")]
#[inline]
pub(crate) fn should_use_parallel<T: AsRef<str>>(texts: &[T]) -> bool {
    let num_texts = texts.len();

    if num_texts >= MIN_TEXTS_FOR_PARALLEL {
        return true;
    }

    // Estimate from the first 20 texts rather than walking all of them
    let total_chars: usize = if num_texts > 20 {
        let sample_chars: usize = texts.iter().take(20).map(|s| s.as_ref().len()).sum();
        (sample_chars * num_texts) / 20
    } else {
        texts.iter().map(|s| s.as_ref().len()).sum()
    };

    total_chars >= MIN_CHARS_FOR_PARALLEL
}
