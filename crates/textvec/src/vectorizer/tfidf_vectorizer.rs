use sprs::CsMat;
use tracing::debug;

use super::{
    count_vectorizer::CountVectorizer,
    params::{TfidfParams, VectorizerParams},
    vocabulary::Vocabulary,
    Vectorizer,
};
use crate::{
    error::{Result, VectorizeError},
    sparse,
};

/// Per-column inverse document frequency weights.
///
/// Weights never increase as document frequency grows.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdfTable {
    weights: Vec<f64>,
}

impl IdfTable {
    /// Derive weights from per-column document frequencies over `n_docs` documents.
    #[must_use]
    pub fn from_document_frequencies(
        doc_freq: &[usize],
        n_docs: usize,
        params: &TfidfParams,
    ) -> Self {
        let n_docs = n_docs as f64;
        let weights = doc_freq
            .iter()
            .map(|&df| {
                let df = df as f64;
                if !params.use_idf {
                    1.0
                } else if params.smooth_idf {
                    ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0
                } else {
                    (n_docs / df).ln() + 1.0
                }
            })
            .collect();
        Self { weights }
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.weights.get(idx).copied()
    }

    /// Smallest weight, i.e. the weight of the most widespread term.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.weights.iter().copied().reduce(f64::min)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TfidfVectorizerState"))]
#[derive(Clone, Debug)]
pub struct TfidfVectorizer {
    count_vectorizer: CountVectorizer,
    tfidf: TfidfParams,
    idf: Option<IdfTable>,
}

impl TfidfVectorizer {
    pub fn new(count_vectorizer_params: VectorizerParams, tfidf: TfidfParams) -> Result<Self> {
        Ok(Self {
            count_vectorizer: CountVectorizer::new(count_vectorizer_params)?,
            tfidf,
            idf: None,
        })
    }

    pub fn fit<T: AsRef<str> + Sync>(&mut self, texts: &[T]) -> Result<()> {
        self.fit_counts(texts).map(|_| ())
    }

    /// Fit vocabulary and idf, returning the raw count matrix of `texts`.
    fn fit_counts<T: AsRef<str> + Sync>(&mut self, texts: &[T]) -> Result<CsMat<f64>> {
        debug!(num_texts = texts.len(), "Fitting TfidfVectorizer");
        let tf_matrix = self.count_vectorizer.fit_transform(texts)?;
        debug!("Calculating IDF values");

        // Count document frequency for each term
        let mut df = vec![0usize; tf_matrix.cols()];
        for row_vec in tf_matrix.outer_iterator() {
            for (col_idx, _val) in row_vec.iter() {
                df[col_idx] += 1;
            }
        }
        self.idf = Some(IdfTable::from_document_frequencies(
            &df,
            texts.len(),
            &self.tfidf,
        ));
        debug!("IDF calculation complete");
        Ok(tf_matrix)
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Result<CsMat<f64>> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using TfidfVectorizer"
        );
        let idf = self.fitted_idf()?;
        let mut tf_matrix = self.count_vectorizer.transform(texts)?;
        self.apply_weights(&mut tf_matrix, idf);
        Ok(tf_matrix)
    }

    /// Fit and transform the same texts, counting them only once.
    pub fn fit_transform<T: AsRef<str> + Sync>(&mut self, texts: &[T]) -> Result<CsMat<f64>> {
        let mut tf_matrix = self.fit_counts(texts)?;
        let idf = self.fitted_idf()?;
        self.apply_weights(&mut tf_matrix, idf);
        Ok(tf_matrix)
    }

    fn apply_weights(&self, tf_matrix: &mut CsMat<f64>, idf: &IdfTable) {
        let sublinear_tf = self.count_vectorizer.params().sublinear_tf();
        for mut row_vec in tf_matrix.outer_iterator_mut() {
            for (col_idx, val) in row_vec.iter_mut() {
                if sublinear_tf {
                    *val = 1.0 + val.ln();
                }
                *val *= idf.as_slice()[col_idx];
            }
        }
        sparse::normalize_rows(tf_matrix, self.tfidf.norm);
    }

    pub fn inverse_transform(&self, matrix: &CsMat<f64>) -> Result<Vec<Vec<String>>> {
        self.count_vectorizer.inverse_transform(matrix)
    }

    pub fn idf(&self) -> Result<&IdfTable> {
        self.fitted_idf()
    }

    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.count_vectorizer.vocabulary()
    }

    pub fn feature_names(&self) -> Result<&[String]> {
        self.count_vectorizer.feature_names()
    }

    #[must_use]
    pub fn num_features(&self) -> Option<usize> {
        self.idf.as_ref().and(self.count_vectorizer.num_features())
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.idf.is_some()
    }

    #[must_use]
    pub fn params(&self) -> &VectorizerParams {
        self.count_vectorizer.params()
    }

    #[must_use]
    pub fn tfidf_params(&self) -> &TfidfParams {
        &self.tfidf
    }

    fn fitted_idf(&self) -> Result<&IdfTable> {
        self.idf.as_ref().ok_or(VectorizeError::NotFitted)
    }
}

impl Vectorizer for TfidfVectorizer {
    fn fit<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<()> {
        TfidfVectorizer::fit(self, corpus)
    }

    fn transform<T: AsRef<str> + Sync>(&self, documents: &[T]) -> Result<CsMat<f64>> {
        TfidfVectorizer::transform(self, documents)
    }

    fn fit_transform<T: AsRef<str> + Sync>(&mut self, corpus: &[T]) -> Result<CsMat<f64>> {
        TfidfVectorizer::fit_transform(self, corpus)
    }

    fn num_features(&self) -> Option<usize> {
        TfidfVectorizer::num_features(self)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TfidfVectorizerState {
    count_vectorizer: CountVectorizer,
    tfidf: TfidfParams,
    idf: Option<IdfTable>,
}

/// The idf table must cover exactly the vocabulary, or both must be absent.
#[cfg(feature = "serde")]
impl TryFrom<TfidfVectorizerState> for TfidfVectorizer {
    type Error = VectorizeError;

    fn try_from(state: TfidfVectorizerState) -> Result<Self> {
        let idf_len = state.idf.as_ref().map(IdfTable::len);
        let vocab_len = state.count_vectorizer.num_features();
        if idf_len != vocab_len {
            return Err(VectorizeError::InvalidConfiguration(format!(
                "idf table has {} weights but the vocabulary has {} terms",
                idf_len.map_or_else(|| "no".to_owned(), |n| n.to_string()),
                vocab_len.map_or_else(|| "no".to_owned(), |n| n.to_string()),
            )));
        }
        Ok(Self {
            count_vectorizer: state.count_vectorizer,
            tfidf: state.tfidf,
            idf: state.idf,
        })
    }
}

#[cfg(feature = "bincode")]
impl TfidfVectorizer {
    /// Encode params, vocabulary and idf table with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::persist::to_bytes(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::persist::from_bytes(bytes)
    }
}
