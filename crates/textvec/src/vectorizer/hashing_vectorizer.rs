use ahash::{HashMap, HashMapExt};
use sprs::CsMat;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::{ngrams, params::HashingParams, tokenizer::Tokenizer, Vectorizer};
use crate::{
    error::{Result, VectorizeError},
    sparse,
};

/// Stateless encoder folding n-grams into a fixed number of columns.
///
/// Distinct terms may share a column. With `alternate_sign` each term adds
/// +1 or -1 depending on its hash, so collisions partly cancel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "HashingParams", into = "HashingParams")
)]
#[derive(Clone, Debug)]
pub struct HashingVectorizer {
    params: HashingParams,
    tokenizer: Tokenizer,
}

impl HashingVectorizer {
    pub fn new(params: HashingParams) -> Result<Self> {
        params.validate()?;
        let tokenizer = Tokenizer::new(params.tokenizer.clone())?;
        Ok(Self { params, tokenizer })
    }

    /// Column and sign a term contributes to.
    #[must_use]
    pub fn slot_of(&self, term: &str) -> (usize, f64) {
        let hash = xxh3_64_with_seed(term.as_bytes(), self.params.seed);
        let slot = (hash % self.params.n_features as u64) as usize;
        let sign = if self.params.alternate_sign && hash >> 63 == 1 {
            -1.0
        } else {
            1.0
        };
        (slot, sign)
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Result<CsMat<f64>> {
        debug!(
            num_texts = texts.len(),
            n_features = self.params.n_features,
            "Transforming texts using HashingVectorizer"
        );
        let tokenized_texts = self.tokenizer.tokenize_batch(texts);
        let ngram_maps = ngrams::count_ngrams_batch(&tokenized_texts, self.params.ngram_range);

        let rows = ngram_maps
            .iter()
            .map(|ngrams| {
                let mut slots: HashMap<usize, f64> = HashMap::with_capacity(ngrams.len());
                for (ngram, &count) in ngrams {
                    let (slot, sign) = self.slot_of(ngram);
                    *slots.entry(slot).or_insert(0.0) += sign * count as f64;
                }
                if self.params.binary {
                    for value in slots.values_mut() {
                        if *value != 0.0 {
                            *value = value.signum();
                        }
                    }
                }
                slots.into_iter().collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut matrix = sparse::csr_from_rows(rows, self.params.n_features)?;
        sparse::normalize_rows(&mut matrix, self.params.norm);
        debug!(
            non_zero_entries = matrix.nnz(),
            "Text transformation complete"
        );
        Ok(matrix)
    }

    #[must_use]
    pub fn num_features(&self) -> usize {
        self.params.n_features
    }

    #[must_use]
    pub fn params(&self) -> &HashingParams {
        &self.params
    }
}

impl Vectorizer for HashingVectorizer {
    /// Nothing to learn.
    fn fit<T: AsRef<str> + Sync>(&mut self, _corpus: &[T]) -> Result<()> {
        Ok(())
    }

    fn transform<T: AsRef<str> + Sync>(&self, documents: &[T]) -> Result<CsMat<f64>> {
        HashingVectorizer::transform(self, documents)
    }

    fn num_features(&self) -> Option<usize> {
        Some(self.params.n_features)
    }
}

impl TryFrom<HashingParams> for HashingVectorizer {
    type Error = VectorizeError;

    fn try_from(params: HashingParams) -> Result<Self> {
        Self::new(params)
    }
}

impl From<HashingVectorizer> for HashingParams {
    fn from(vectorizer: HashingVectorizer) -> Self {
        vectorizer.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sparse::{row_norm, row_pairs},
        vectorizer::Norm,
    };

    fn hashing(params: HashingParams) -> HashingVectorizer {
        HashingVectorizer::new(params).unwrap()
    }

    #[test]
    fn test_width_is_fixed() {
        for width in [1, 7, 20, 1 << 20] {
            let vectorizer = hashing(HashingParams::with_n_features(width));
            let matrix = vectorizer
                .transform(&["the quick brown fox", "", "jumped over the lazy dog"])
                .unwrap();
            assert_eq!(matrix.shape(), (3, width));
        }
    }

    #[test]
    fn test_rows_have_unit_norm_or_are_empty() {
        let vectorizer = hashing(HashingParams::with_n_features(20));
        let matrix = vectorizer
            .transform(&[
                "The quick brown fox jumped over the lazy dog.",
                "",
                "!!! 123",
            ])
            .unwrap();
        let norm = row_norm(matrix.outer_view(0).unwrap().data(), Norm::L2);
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(row_pairs(&matrix, 1).is_empty());
        assert!(row_pairs(&matrix, 2).is_empty());
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            HashingVectorizer::new(HashingParams::with_n_features(0)),
            Err(VectorizeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_slot_matches_transform() {
        let vectorizer = hashing(HashingParams {
            norm: Norm::None,
            ..HashingParams::with_n_features(64)
        });
        let (slot, sign) = vectorizer.slot_of("hello");
        assert!(slot < 64);
        let matrix = vectorizer.transform(&["hello hello"]).unwrap();
        assert_eq!(row_pairs(&matrix, 0), vec![(slot, 2.0 * sign)]);
    }

    #[test]
    fn test_single_slot_collects_everything() {
        let vectorizer = hashing(HashingParams {
            alternate_sign: false,
            norm: Norm::None,
            ..HashingParams::with_n_features(1)
        });
        let matrix = vectorizer.transform(&["alpha beta gamma alpha"]).unwrap();
        assert_eq!(row_pairs(&matrix, 0), vec![(0, 4.0)]);
    }

    #[test]
    fn test_unsigned_values_are_positive() {
        let vectorizer = hashing(HashingParams {
            alternate_sign: false,
            ..HashingParams::with_n_features(16)
        });
        let text = (0..200).map(|i| format!("term{i}x")).collect::<Vec<_>>().join(" ");
        let matrix = vectorizer.transform(&[text]).unwrap();
        assert!(row_pairs(&matrix, 0).iter().all(|(_, v)| *v > 0.0));
    }

    #[test]
    fn test_signed_hashing_uses_both_signs() {
        let vectorizer = hashing(HashingParams::default());
        let signs = (0..200)
            .map(|i| vectorizer.slot_of(&format!("term{i}")).1)
            .collect::<Vec<_>>();
        assert!(signs.iter().any(|s| *s > 0.0));
        assert!(signs.iter().any(|s| *s < 0.0));
    }

    #[test]
    fn test_seed_changes_slots() {
        let a = hashing(HashingParams::default());
        let b = hashing(HashingParams {
            seed: 42,
            ..Default::default()
        });
        assert!((0..50).any(|i| {
            let term = format!("word{i}");
            a.slot_of(&term) != b.slot_of(&term)
        }));
    }

    #[test]
    fn test_deterministic() {
        let vectorizer = hashing(HashingParams::with_n_features(32));
        let texts = ["some text here", "more text"];
        let first = vectorizer.transform(&texts).unwrap();
        let second = vectorizer.transform(&texts).unwrap();
        assert_eq!(row_pairs(&first, 0), row_pairs(&second, 0));
        assert_eq!(row_pairs(&first, 1), row_pairs(&second, 1));
    }

    #[test]
    fn test_binary_clamps_magnitudes() {
        let vectorizer = hashing(HashingParams {
            binary: true,
            norm: Norm::None,
            ..HashingParams::with_n_features(1024)
        });
        let matrix = vectorizer.transform(&["repeat repeat repeat"]).unwrap();
        let pairs = row_pairs(&matrix, 0);
        assert_eq!(pairs.len(), 1);
        assert!((pairs[0].1.abs() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_is_noop() {
        let mut vectorizer = hashing(HashingParams::with_n_features(8));
        let empty: [&str; 0] = [];
        assert!(Vectorizer::fit(&mut vectorizer, &empty).is_ok());
        assert!(Vectorizer::is_fitted(&vectorizer));
        assert_eq!(Vectorizer::num_features(&vectorizer), Some(8));
    }
}
