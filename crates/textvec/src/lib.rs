//! # textvec
//!
//! Turn raw documents into sparse numeric vectors.
//!
//! Three vectorizers share one configurable [`Tokenizer`]:
//!
//! - [`CountVectorizer`]: learns a vocabulary and counts term occurrences.
//! - [`TfidfVectorizer`]: counts weighted by smoothed inverse document
//!   frequency, then row-normalized.
//! - [`HashingVectorizer`]: no vocabulary; terms are hashed into a fixed
//!   number of columns with signed accumulation.
//!
//! Every vectorizer returns a CSR [`sprs::CsMat<f64>`] with one row per
//! document. See [`sparse`] for `(index, value)` pairs and dense rows.
//!
//! ```rust
//! use textvec::{sparse, TfidfParams, TfidfVectorizer, VectorizerParams};
//!
//! let corpus = ["the cat sat", "the dog sat", "the bird flew"];
//! let mut vectorizer = TfidfVectorizer::new(VectorizerParams::default(), TfidfParams::default())?;
//! let matrix = vectorizer.fit_transform(&corpus)?;
//!
//! assert_eq!(matrix.shape(), (3, 6));
//! let pairs = sparse::row_pairs(&matrix, 0);
//! assert_eq!(pairs.len(), 3);
//! # Ok::<(), textvec::VectorizeError>(())
//! ```
//!
//! ```rust
//! use textvec::{HashingParams, HashingVectorizer};
//!
//! let vectorizer = HashingVectorizer::new(HashingParams::with_n_features(32))?;
//! let matrix = vectorizer.transform(&["any text, no fitting required"])?;
//! assert_eq!(matrix.cols(), 32);
//! # Ok::<(), textvec::VectorizeError>(())
//! ```

mod error;
#[cfg(feature = "bincode")]
pub mod persist;
pub mod sparse;
mod vectorizer;

pub use error::{Result, VectorizeError};
pub use sprs::CsMat;
pub use vectorizer::{
    CountVectorizer, HashingParams, HashingVectorizer, IdfTable, Norm, TfidfParams,
    TfidfVectorizer, Tokenizer, TokenizerConfig, Vectorizer, VectorizerParams, Vocabulary,
    DEFAULT_N_FEATURES, DEFAULT_TOKEN_PATTERN,
};
