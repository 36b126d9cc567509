use ahash::{HashMap, HashMapExt};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Documents needed before n-gram counting moves to the rayon pool
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 100;

/// Corpus-level statistics for a single term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermStats {
    /// Number of documents containing the term at least once.
    pub doc_freq: usize,
    /// Total occurrences across the corpus.
    pub total: usize,
}

/// Count word n-grams of every size in `min_n..=max_n`, joined by a single space.
pub fn count_ngrams(tokens: &[String], (min_n, max_n): (usize, usize)) -> HashMap<String, usize> {
    let mut ngram_counter = HashMap::new();

    for n in min_n..=max_n {
        if n == 0 {
            continue;
        }
        for window in tokens.windows(n) {
            *ngram_counter.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    ngram_counter
}

/// Count n-grams for every tokenized document.
pub fn count_ngrams_batch(
    tokenized_texts: &[Vec<String>],
    ngram_range: (usize, usize),
) -> Vec<HashMap<String, usize>> {
    #[cfg(feature = "parallel")]
    {
        if tokenized_texts.len() >= PARALLEL_THRESHOLD {
            return tokenized_texts
                .par_iter()
                .map(|tokens| count_ngrams(tokens, ngram_range))
                .collect();
        }
    }
    tokenized_texts
        .iter()
        .map(|tokens| count_ngrams(tokens, ngram_range))
        .collect()
}

/// Aggregate per-document counts into document frequency and total frequency.
pub fn term_statistics(ngram_maps: &[HashMap<String, usize>]) -> HashMap<String, TermStats> {
    let mut stats: HashMap<String, TermStats> = HashMap::new();
    for ngram_map in ngram_maps {
        for (term, &count) in ngram_map {
            let entry = stats.entry(term.clone()).or_default();
            entry.doc_freq += 1;
            entry.total += count;
        }
    }
    stats
}
