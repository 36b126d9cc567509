use std::collections::BTreeSet;

use textvec::{
    sparse::{row_norm, row_pairs, to_dense_rows},
    CountVectorizer, HashingParams, HashingVectorizer, Norm, TfidfParams, TfidfVectorizer,
    Tokenizer, VectorizeError, Vectorizer, VectorizerParams,
};

const CORPUS: [&str; 4] = [
    "The quick brown fox jumped over the lazy dog.",
    "A lazy afternoon: the dog sleeps, the fox waits.",
    "Quick thinking wins 3 out of 4 games!",
    "",
];

fn count_vectorizer() -> CountVectorizer {
    CountVectorizer::new(VectorizerParams::default()).expect("default params")
}

fn tfidf_vectorizer() -> TfidfVectorizer {
    TfidfVectorizer::new(VectorizerParams::default(), TfidfParams::default())
        .expect("default params")
}

fn assert_unit_or_zero_rows(matrix: &textvec::CsMat<f64>) {
    for row_vec in matrix.outer_iterator() {
        let norm = row_norm(row_vec.data(), Norm::L2);
        if row_vec.nnz() == 0 {
            assert!(norm.abs() < f64::EPSILON);
        } else {
            assert!((norm - 1.0).abs() < 1e-9, "row norm was {norm}");
        }
    }
}

#[test]
fn vocabulary_size_matches_distinct_tokens() {
    let tokenizer = Tokenizer::default();
    let distinct = CORPUS
        .iter()
        .flat_map(|doc| tokenizer.tokenize(doc))
        .collect::<BTreeSet<_>>();

    let mut vectorizer = count_vectorizer();
    vectorizer.fit(&CORPUS).expect("fit");
    let vocab = vectorizer.vocabulary().expect("fitted");

    assert_eq!(vocab.len(), distinct.len());
    let terms = vocab.terms().iter().cloned().collect::<BTreeSet<_>>();
    assert_eq!(terms, distinct);
}

#[test]
fn count_matches_manual_tally() {
    let tokenizer = Tokenizer::default();
    let mut vectorizer = count_vectorizer();
    let matrix = vectorizer.fit_transform(&CORPUS).expect("fit_transform");
    let vocab = vectorizer.vocabulary().expect("fitted");

    for (row, doc) in CORPUS.iter().enumerate() {
        let mut expected = vec![0.0; vocab.len()];
        for token in tokenizer.tokenize(doc) {
            expected[vocab.get(&token).expect("token in vocabulary")] += 1.0;
        }
        assert_eq!(to_dense_rows(&matrix)[row], expected, "row {row}");
    }
}

#[test]
fn quick_brown_fox_example() {
    let doc = ["The quick brown fox jumped over the lazy dog."];
    let mut vectorizer = count_vectorizer();
    vectorizer.fit(&doc).expect("fit");
    assert_eq!(vectorizer.num_features(), Some(8));

    let matrix = vectorizer.transform(&doc).expect("transform");
    let the = vectorizer.vocabulary().unwrap().get("the").unwrap();
    let pairs = row_pairs(&matrix, 0);
    assert_eq!(pairs.len(), 8);
    for (col, value) in pairs {
        if col == the {
            assert_eq!(value, 2.0);
        } else {
            assert_eq!(value, 1.0);
        }
    }
}

#[test]
fn idf_orders_by_document_frequency() {
    let corpus = ["shared alpha", "shared beta", "shared beta gamma"];
    let mut vectorizer = tfidf_vectorizer();
    vectorizer.fit(&corpus).expect("fit");
    let vocab = vectorizer.vocabulary().unwrap();
    let idf = vectorizer.idf().unwrap();

    let shared = idf.get(vocab.get("shared").unwrap()).unwrap();
    let beta = idf.get(vocab.get("beta").unwrap()).unwrap();
    let alpha = idf.get(vocab.get("alpha").unwrap()).unwrap();
    let gamma = idf.get(vocab.get("gamma").unwrap()).unwrap();

    assert_eq!(idf.min(), Some(shared));
    assert!(alpha > shared);
    assert!(alpha > beta && beta > shared);
    assert_eq!(alpha, gamma);
    assert!(idf.as_slice().iter().all(|w| *w > 0.0));
}

#[test]
fn tfidf_rows_are_unit_length() {
    let mut vectorizer = tfidf_vectorizer();
    let matrix = vectorizer.fit_transform(&CORPUS).expect("fit_transform");
    assert_unit_or_zero_rows(&matrix);
    assert!(row_pairs(&matrix, 3).is_empty());
}

#[test]
fn hashing_rows_are_unit_length_with_fixed_width() {
    for width in [2, 17, 1024] {
        let vectorizer =
            HashingVectorizer::new(HashingParams::with_n_features(width)).expect("valid width");
        let matrix = vectorizer.transform(&CORPUS).expect("transform");
        assert_eq!(matrix.shape(), (CORPUS.len(), width));
        assert_unit_or_zero_rows(&matrix);
    }
}

#[test]
fn out_of_vocabulary_documents_give_zero_rows() {
    let mut count = count_vectorizer();
    count.fit(&["alpha beta"]).unwrap();
    let mut tfidf = tfidf_vectorizer();
    tfidf.fit(&["alpha beta"]).unwrap();

    let unseen = ["gamma delta epsilon", "!!!", "a 1 2"];
    let counts = count.transform(&unseen).unwrap();
    let weights = tfidf.transform(&unseen).unwrap();
    assert_eq!(counts.shape(), (3, 2));
    assert_eq!(weights.shape(), (3, 2));
    assert_eq!(counts.nnz(), 0);
    assert_eq!(weights.nnz(), 0);
}

#[test]
fn error_conditions() {
    let count = count_vectorizer();
    assert_eq!(count.transform(&["x"]).unwrap_err(), VectorizeError::NotFitted);
    let tfidf = tfidf_vectorizer();
    assert_eq!(tfidf.transform(&["x"]).unwrap_err(), VectorizeError::NotFitted);

    let mut count = count_vectorizer();
    let nothing: Vec<String> = Vec::new();
    assert_eq!(count.fit(&nothing), Err(VectorizeError::EmptyVocabulary));
    assert_eq!(count.fit(&["", "  ", "? !"]), Err(VectorizeError::EmptyVocabulary));

    assert!(matches!(
        HashingVectorizer::new(HashingParams::with_n_features(0)),
        Err(VectorizeError::InvalidConfiguration(_))
    ));
}

#[test]
fn generic_pipeline_over_all_vectorizers() {
    fn widths<V: Vectorizer>(mut vectorizer: V) -> (usize, usize) {
        let matrix = vectorizer.fit_transform(&CORPUS).expect("fit_transform");
        (matrix.rows(), matrix.cols())
    }

    let (rows, cols) = widths(count_vectorizer());
    assert_eq!(rows, CORPUS.len());
    let (_, tfidf_cols) = widths(tfidf_vectorizer());
    assert_eq!(cols, tfidf_cols);
    let hashing = HashingVectorizer::new(HashingParams::with_n_features(64)).unwrap();
    assert_eq!(widths(hashing), (CORPUS.len(), 64));
}

#[test]
fn transform_is_read_only_and_shareable() {
    let mut vectorizer = tfidf_vectorizer();
    vectorizer.fit(&CORPUS).unwrap();
    let before = vectorizer.idf().unwrap().clone();

    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(|| vectorizer.transform(&CORPUS).unwrap()))
            .collect::<Vec<_>>();
        let outputs = handles
            .into_iter()
            .map(|h| to_dense_rows(&h.join().unwrap()))
            .collect::<Vec<_>>();
        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    });

    assert_eq!(vectorizer.idf().unwrap(), &before);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_batches_match_sequential_chunks() {
    let words = ["market", "stock", "price", "trade", "volume", "signal", "fund", "bond"];
    let corpus: Vec<String> = (0..160)
        .map(|i| {
            (0..=(i % 7))
                .map(|j| words[(i * 3 + j * 5) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let tokenizer = Tokenizer::default();
    let batched = tokenizer.tokenize_batch(&corpus);
    let one_by_one: Vec<Vec<String>> = corpus.iter().map(|doc| tokenizer.tokenize(doc)).collect();
    assert_eq!(batched, one_by_one);

    let params = VectorizerParams::default().with_ngram_range(1..=2);
    let mut tfidf = TfidfVectorizer::new(params, TfidfParams::default()).unwrap();
    let full = to_dense_rows(&tfidf.fit_transform(&corpus).unwrap());
    let chunked: Vec<Vec<f64>> = corpus
        .chunks(10)
        .flat_map(|chunk| to_dense_rows(&tfidf.transform(chunk).unwrap()))
        .collect();
    assert_eq!(full, chunked);

    let hashing = HashingVectorizer::new(HashingParams::with_n_features(64)).unwrap();
    let full = to_dense_rows(&hashing.transform(&corpus).unwrap());
    let chunked: Vec<Vec<f64>> = corpus
        .chunks(10)
        .flat_map(|chunk| to_dense_rows(&hashing.transform(chunk).unwrap()))
        .collect();
    assert_eq!(full, chunked);
}
