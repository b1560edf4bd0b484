use std::collections::HashSet;

use nalgebra::DVector;

use crate::models::UserRating;
use crate::services::cosine;
use crate::services::features::FeatureMatrix;

/// Result of content-based ranking for one user.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOutcome {
    /// Unrated movies ranked by similarity to the user profile, best first.
    Ranked(Vec<(i64, f64)>),
    /// The user has no usable rating history in the feature space.
    ColdStart,
}

/// Ranks unrated movies by cosine similarity between the user's profile
/// vector and each movie's feature vector.
///
/// The profile is the rating-weighted centroid of the feature vectors of the
/// user's rated movies. A user with no ratings, or whose rated movies are all
/// absent from the feature matrix, is a cold start.
pub fn rank_for_user(features: &FeatureMatrix, user_ratings: &[UserRating]) -> ContentOutcome {
    if user_ratings.is_empty() || features.is_empty() {
        return ContentOutcome::ColdStart;
    }

    let mut profile = DVector::zeros(features.vocab_len());
    let mut total_weight = 0.0;
    for rating in user_ratings {
        if let Some(vector) = features.vector(rating.movie_id) {
            profile += vector * rating.value;
            total_weight += rating.value;
        }
    }

    if total_weight <= 0.0 {
        return ContentOutcome::ColdStart;
    }
    profile /= total_weight;

    let rated: HashSet<i64> = user_ratings.iter().map(|r| r.movie_id).collect();

    let mut ranked: Vec<(i64, f64)> = features
        .iter()
        .filter(|(movie_id, _)| !rated.contains(movie_id))
        .map(|(movie_id, vector)| (movie_id, cosine(&profile, vector)))
        .collect();
    sort_by_score(&mut ranked);

    ContentOutcome::Ranked(ranked)
}

/// Ranks all other movies by similarity to the given movie's feature vector.
///
/// An id absent from the feature matrix yields an empty ranking; unknown
/// items are not substituted with a fallback.
pub fn similar_movies(features: &FeatureMatrix, movie_id: i64) -> Vec<(i64, f64)> {
    let Some(target) = features.vector(movie_id) else {
        return Vec::new();
    };

    let mut ranked: Vec<(i64, f64)> = features
        .iter()
        .filter(|(other_id, _)| *other_id != movie_id)
        .map(|(other_id, vector)| (other_id, cosine(target, vector)))
        .collect();
    sort_by_score(&mut ranked);

    ranked
}

/// Score descending, ascending movie id on ties.
fn sort_by_score(ranked: &mut [(i64, f64)]) {
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
}
