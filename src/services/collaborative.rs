use nalgebra::DVector;

use crate::services::cosine;
use crate::services::matrix::RatingMatrix;

/// Upper bound on the latent factor rank.
pub const MAX_LATENT_RANK: usize = 50;

/// Result of ranking candidates for one user. Cold start and degenerate
/// matrices are ordinary outcomes here, not errors; the caller substitutes
/// the popularity fallback for both.
#[derive(Debug, Clone, PartialEq)]
pub enum CollaborativeOutcome {
    /// Candidates ranked by predicted rating, best first.
    Ranked(Vec<(i64, f64)>),
    /// The target user is not in the eligible matrix.
    ColdStart,
    /// The matrix is too small to support latent-factor reduction.
    DegenerateModel,
}

/// Ranks every movie the target user has not rated by a similarity-weighted
/// average of other users' ratings in latent factor space.
///
/// The matrix is reduced by SVD to rank `min(50, min(rows, cols) - 1)` and
/// user similarity is the cosine between latent vectors. Raw similarities are
/// used as weights, negative neighbors included; a movie whose weight sum is
/// not positive is excluded rather than divided toward infinity.
pub fn rank_candidates(matrix: &RatingMatrix, user_id: i64) -> CollaborativeOutcome {
    let Some(user_idx) = matrix.user_row(user_id) else {
        return CollaborativeOutcome::ColdStart;
    };

    let k = MAX_LATENT_RANK.min(matrix.rows().min(matrix.cols()).saturating_sub(1));
    if k < 1 {
        return CollaborativeOutcome::DegenerateModel;
    }

    let Some(latent) = reduce(matrix, k) else {
        return CollaborativeOutcome::DegenerateModel;
    };

    let similarities: Vec<f64> = latent
        .iter()
        .map(|other| cosine(&latent[user_idx], other))
        .collect();

    let mut predictions: Vec<(i64, f64)> = Vec::new();
    for (col, &movie_id) in matrix.movie_ids().iter().enumerate() {
        if matrix.rating_at(user_idx, col).is_some() {
            continue;
        }

        let mut weight_sum = 0.0;
        let mut weighted_ratings = 0.0;
        for (other_idx, &similarity) in similarities.iter().enumerate() {
            if other_idx == user_idx {
                continue;
            }
            if let Some(rating) = matrix.rating_at(other_idx, col) {
                weight_sum += similarity;
                weighted_ratings += similarity * rating;
            }
        }

        // A non-positive weight sum would turn the average into noise (or a
        // division by zero); such movies are dropped from the candidate set.
        if weight_sum > 0.0 {
            predictions.push((movie_id, weighted_ratings / weight_sum));
        }
    }

    predictions.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    CollaborativeOutcome::Ranked(predictions)
}

/// Projects users into latent factor space: the first `k` left singular
/// vectors scaled by their singular values, one `DVector` per user row.
fn reduce(matrix: &RatingMatrix, k: usize) -> Option<Vec<DVector<f64>>> {
    let svd = matrix.matrix().clone().svd(true, false);
    let u = svd.u?;
    let singular_values = svd.singular_values;

    let rows = matrix.rows();
    let mut latent = Vec::with_capacity(rows);
    for i in 0..rows {
        let mut v = DVector::zeros(k);
        for j in 0..k {
            v[j] = u[(i, j)] * singular_values[j];
        }
        latent.push(v);
    }
    Some(latent)
}
