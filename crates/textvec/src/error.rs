use thiserror::Error;

/// Errors returned by the vectorizers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VectorizeError {
    /// No term survived tokenization and document-frequency filtering.
    #[error("empty vocabulary: no terms survived tokenization and filtering")]
    EmptyVocabulary,
    /// `transform` was called before a successful `fit`.
    #[error("vectorizer is not fitted; call `fit` first")]
    NotFitted,
    /// Rejected parameters, or inputs inconsistent with the fitted state.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Encoding or decoding a fitted vectorizer failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, VectorizeError>;
