use ahash::HashMap;
use sprs::CsMat;
use tracing::{debug, warn};

use super::{
    ngrams::{self, TermStats},
    params::VectorizerParams,
    tokenizer::Tokenizer,
    vocabulary::Vocabulary,
    Vectorizer,
};
use crate::{
    error::{Result, VectorizeError},
    sparse,
};

/// Bag-of-n-grams encoder: one column per vocabulary term, valued by occurrence count.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CountVectorizerState"))]
#[derive(Clone, Debug)]
pub struct CountVectorizer {
    params: VectorizerParams,
    /// Rebuilt from `params` on deserialization.
    #[cfg_attr(feature = "serde", serde(skip))]
    tokenizer: Tokenizer,
    /// `None` until the first successful `fit`.
    vocab: Option<Vocabulary>,
}

impl CountVectorizer {
    /// Create an unfitted vectorizer, validating `params` and compiling the tokenizer.
    pub fn new(params: VectorizerParams) -> Result<Self> {
        params.validate()?;
        let tokenizer = Tokenizer::new(params.tokenizer().clone())?;
        Ok(Self {
            params,
            tokenizer,
            vocab: None,
        })
    }

    /// Learn the vocabulary from `texts`, replacing any previous one.
    ///
    /// On error the previously fitted state is kept.
    pub fn fit<T: AsRef<str> + Sync>(&mut self, texts: &[T]) -> Result<()> {
        debug!(num_texts = texts.len(), "Fitting CountVectorizer");
        let ngram_maps = self.count_documents(texts);
        self.vocab = Some(self.build_vocabulary(&ngram_maps)?);
        Ok(())
    }

    /// Tokenize and count n-grams for every document.
    fn count_documents<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<HashMap<String, usize>> {
        let tokenized_texts = self.tokenizer.tokenize_batch(texts);
        ngrams::count_ngrams_batch(&tokenized_texts, self.params.ngram_range())
    }

    fn build_vocabulary(&self, ngram_maps: &[HashMap<String, usize>]) -> Result<Vocabulary> {
        debug!("Building vocabulary from n-gram counts");
        let stats = ngrams::term_statistics(ngram_maps);
        let vocab_size = stats.len();

        let (min_count, max_count) = self.params.df_bounds(ngram_maps.len())?;
        debug!(min_count, max_count, "Applying document frequency filtering");
        let mut kept = stats
            .into_iter()
            .filter(|(_, s)| s.doc_freq >= min_count && s.doc_freq <= max_count)
            .collect::<Vec<(String, TermStats)>>();
        debug!(
            original_size = vocab_size,
            filtered_size = kept.len(),
            "Vocabulary filtered by document frequency"
        );

        if let Some(max_features) = self.params.max_features() {
            if kept.len() > max_features {
                // Most frequent first, ties broken by term order
                kept.sort_by(|(term_a, a), (term_b, b)| {
                    b.total.cmp(&a.total).then_with(|| term_a.cmp(term_b))
                });
                kept.truncate(max_features);
            }
        }

        if kept.is_empty() {
            warn!(
                num_texts = ngram_maps.len(),
                original_size = vocab_size,
                "No terms left to build a vocabulary from"
            );
            return Err(VectorizeError::EmptyVocabulary);
        }

        let vocab = Vocabulary::from_terms(kept.into_iter().map(|(term, _)| term));
        debug!(vocab_size = vocab.len(), "CountVectorizer fitting complete");
        Ok(vocab)
    }

    /// Map `texts` to a `texts.len() x num_features` count matrix.
    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Result<CsMat<f64>> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using CountVectorizer"
        );
        let vocab = self.fitted_vocabulary()?;
        let ngram_maps = self.count_documents(texts);
        self.transform_from_counts(vocab, &ngram_maps)
    }

    /// Build the CSR matrix from pre-computed n-gram counts.
    /// Out-of-vocabulary n-grams are dropped.
    fn transform_from_counts(
        &self,
        vocab: &Vocabulary,
        ngram_maps: &[HashMap<String, usize>],
    ) -> Result<CsMat<f64>> {
        let binary = self.params.binary();
        let rows = ngram_maps
            .iter()
            .map(|ngrams| {
                ngrams
                    .iter()
                    .filter_map(|(ngram, &count)| {
                        vocab.get(ngram).map(|col_idx| {
                            let value = if binary { 1.0 } else { count as f64 };
                            (col_idx, value)
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let matrix = sparse::csr_from_rows(rows, vocab.len())?;
        debug!(
            non_zero_entries = matrix.nnz(),
            "Text transformation complete"
        );
        Ok(matrix)
    }

    /// `fit` followed by `transform` on the same texts, tokenizing and
    /// counting n-grams only once.
    pub fn fit_transform<T: AsRef<str> + Sync>(&mut self, texts: &[T]) -> Result<CsMat<f64>> {
        debug!(
            num_texts = texts.len(),
            "fit_transform: tokenizing and computing n-grams once"
        );
        let ngram_maps = self.count_documents(texts);
        let vocab = self.build_vocabulary(&ngram_maps)?;
        let transformed = self.transform_from_counts(&vocab, &ngram_maps)?;
        self.vocab = Some(vocab);
        Ok(transformed)
    }

    /// Vocabulary terms with a non-zero value, per row, in column order.
    pub fn inverse_transform(&self, matrix: &CsMat<f64>) -> Result<Vec<Vec<String>>> {
        let vocab = self.fitted_vocabulary()?;
        if matrix.cols() != vocab.len() {
            return Err(VectorizeError::InvalidConfiguration(format!(
                "matrix has {} columns but the vocabulary has {} terms",
                matrix.cols(),
                vocab.len()
            )));
        }
        Ok(matrix
            .outer_iterator()
            .map(|row_vec| {
                row_vec
                    .iter()
                    .filter(|(_, val)| **val != 0.0)
                    .filter_map(|(col_idx, _)| vocab.term(col_idx).map(str::to_owned))
                    .collect()
            })
            .collect())
    }

    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.fitted_vocabulary()
    }

    /// Vocabulary terms in column order.
    pub fn feature_names(&self) -> Result<&[String]> {
        self.fitted_vocabulary().map(Vocabulary::terms)
    }

    /// Vocabulary size, or `None` before fitting.
    #[must_use]
    pub fn num_features(&self) -> Option<usize> {
        self.vocab.as_ref().map(Vocabulary::len)
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.vocab.is_some()
    }

    #[must_use]
    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    fn fitted_vocabulary(&self) -> Result<&Vocabulary> {
        self.vocab.as_ref().ok_or(VectorizeError::NotFitted)
    }
}

impl Vectorizer for CountVectorizer {
    fn fit<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<()> {
        CountVectorizer::fit(self, corpus)
    }

    fn transform<T: AsRef<str> + Sync>(&self, documents: &[T]) -> Result<CsMat<f64>> {
        CountVectorizer::transform(self, documents)
    }

    fn fit_transform<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<CsMat<f64>> {
        CountVectorizer::fit_transform(self, corpus)
    }

    fn num_features(&self) -> Option<usize> {
        CountVectorizer::num_features(self)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CountVectorizerState {
    params: VectorizerParams,
    vocab: Option<Vocabulary>,
}

#[cfg(feature = "serde")]
impl TryFrom<CountVectorizerState> for CountVectorizer {
    type Error = VectorizeError;

    fn try_from(state: CountVectorizerState) -> Result<Self> {
        let mut vectorizer = Self::new(state.params)?;
        vectorizer.vocab = state.vocab;
        Ok(vectorizer)
    }
}

#[cfg(feature = "bincode")]
impl CountVectorizer {
    /// Encode params and fitted vocabulary with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::persist::to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::persist::from_bytes(bytes)
    }
}
