use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Movie, RecommendationSource};

/// Rank-fusion weight for collaborative-sourced candidates.
pub const COLLABORATIVE_WEIGHT: f64 = 0.6;
/// Rank-fusion weight for content-sourced candidates.
pub const CONTENT_WEIGHT: f64 = 0.4;

/// A fused candidate with its combined score and provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
    pub source: RecommendationSource,
}

/// Fuses the two predictor rankings by position-decayed score.
///
/// The item at position `i` of a list of length `n` scores
/// `weight * (1 - i / n)`. An id present in both lists has its scores summed
/// and is tagged hybrid; otherwise it keeps its list's score and source.
/// Ordering is combined score descending, ascending movie id on ties.
pub fn fuse(collaborative: Vec<Movie>, content: Vec<Movie>, limit: usize) -> Vec<ScoredMovie> {
    let collaborative_len = collaborative.len();
    let content_len = content.len();

    let mut merged: HashMap<i64, ScoredMovie> = HashMap::new();

    for (i, movie) in collaborative.into_iter().enumerate() {
        merged.insert(
            movie.id,
            ScoredMovie {
                movie,
                score: decayed_score(COLLABORATIVE_WEIGHT, i, collaborative_len),
                source: RecommendationSource::Collaborative,
            },
        );
    }

    for (i, movie) in content.into_iter().enumerate() {
        let score = decayed_score(CONTENT_WEIGHT, i, content_len);
        match merged.get_mut(&movie.id) {
            Some(existing) => {
                existing.score += score;
                existing.source = RecommendationSource::Hybrid;
            }
            None => {
                merged.insert(
                    movie.id,
                    ScoredMovie {
                        movie,
                        score,
                        source: RecommendationSource::ContentBased,
                    },
                );
            }
        }
    }

    let mut fused: Vec<ScoredMovie> = merged.into_values().collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.movie.id.cmp(&b.movie.id))
    });
    fused.truncate(limit);

    fused
}

fn decayed_score(weight: f64, position: usize, len: usize) -> f64 {
    weight * (1.0 - position as f64 / len as f64)
}
