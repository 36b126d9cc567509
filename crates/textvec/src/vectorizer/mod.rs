mod count_vectorizer;
mod hashing_vectorizer;
mod ngrams;
mod params;
mod tfidf_vectorizer;
mod tokenizer;
mod vocabulary;

use sprs::CsMat;

pub use count_vectorizer::CountVectorizer;
pub use hashing_vectorizer::HashingVectorizer;
pub use params::{HashingParams, Norm, TfidfParams, VectorizerParams, DEFAULT_N_FEATURES};
pub use tfidf_vectorizer::{IdfTable, TfidfVectorizer};
pub use tokenizer::{Tokenizer, TokenizerConfig, DEFAULT_TOKEN_PATTERN};
pub use vocabulary::Vocabulary;

use crate::error::Result;

/// Common surface of the count, tf-idf and hashing vectorizers.
///
/// `fit` learns whatever state the vectorizer needs (nothing, for hashing);
/// `transform` maps documents to a CSR matrix with one row per document and
/// never mutates that state.
pub trait Vectorizer {
    fn fit<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<()>;

    fn transform<T: AsRef<str> + Sync>(&self, documents: &[T]) -> Result<CsMat<f64>>;

    fn fit_transform<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<CsMat<f64>> {
        self.fit(corpus)?;
        self.transform(corpus)
    }

    /// Output width, or `None` before fitting.
    fn num_features(&self) -> Option<usize>;

    fn is_fitted(&self) -> bool {
        self.num_features().is_some()
    }
}
