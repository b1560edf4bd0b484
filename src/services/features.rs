use std::collections::{BTreeMap, HashMap};

use nalgebra::DVector;

use crate::models::Movie;

/// Common English terms excluded from the vocabulary. Title/description text
/// is dominated by these otherwise.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "between", "both", "but", "by", "can", "could",
    "did", "do", "does", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "just", "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "out", "over", "own", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your",
];

/// TF-IDF feature matrix over the movie catalog.
///
/// One L2-normalized weight vector per movie, built from the concatenation of
/// title, description, genre and director. The vocabulary is capped at
/// `max_features` terms, selected by total corpus frequency with an
/// alphabetical tie-break, and columns are ordered alphabetically so repeated
/// builds over the same catalog are identical.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    vectors: Vec<DVector<f64>>,
    movie_index: HashMap<i64, usize>,
    movie_ids: Vec<i64>,
    vocabulary: Vec<String>,
}

impl FeatureMatrix {
    pub fn build(movies: &[Movie], max_features: usize) -> Self {
        // Tokenize every document once; keep per-document term counts.
        let mut doc_counts: Vec<BTreeMap<String, usize>> = Vec::with_capacity(movies.len());
        let mut movie_ids: Vec<i64> = Vec::with_capacity(movies.len());

        for movie in movies {
            let mut counts = BTreeMap::new();
            for token in tokenize(&movie.feature_text()) {
                *counts.entry(token).or_insert(0) += 1;
            }
            doc_counts.push(counts);
            movie_ids.push(movie.id);
        }

        // Corpus frequency and document frequency per term, in term order.
        let mut corpus_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            for (term, count) in counts {
                *corpus_freq.entry(term).or_insert(0) += count;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Cap the vocabulary: most frequent terms first, alphabetical on ties,
        // then restore alphabetical column order.
        let mut ranked: Vec<(&str, usize)> =
            corpus_freq.iter().map(|(&t, &c)| (t, c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let term_index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.as_str(), idx))
            .collect();

        // Smoothed idf, matching the conventional ln((1 + n) / (1 + df)) + 1.
        let n_docs = doc_counts.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vectors: Vec<DVector<f64>> = doc_counts
            .iter()
            .map(|counts| {
                let mut row = DVector::zeros(vocabulary.len());
                for (term, &count) in counts {
                    if let Some(&idx) = term_index.get(term.as_str()) {
                        row[idx] = count as f64 * idf[idx];
                    }
                }
                let norm = row.norm();
                if norm > 0.0 {
                    row /= norm;
                }
                row
            })
            .collect();

        let movie_index: HashMap<i64, usize> = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        Self {
            vectors,
            movie_index,
            movie_ids,
            vocabulary,
        }
    }

    pub fn vector(&self, movie_id: i64) -> Option<&DVector<f64>> {
        self.movie_index
            .get(&movie_id)
            .map(|&idx| &self.vectors[idx])
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.movie_index.contains_key(&movie_id)
    }

    /// Catalog movies in build order, aligned with the row vectors.
    pub fn movie_ids(&self) -> &[i64] {
        &self.movie_ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &DVector<f64>)> {
        self.movie_ids
            .iter()
            .copied()
            .zip(self.vectors.iter())
    }

    pub fn vocab_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty() || self.vocabulary.is_empty()
    }
}

/// Lowercases and splits on non-alphanumeric boundaries, dropping single
/// characters and stop words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}
