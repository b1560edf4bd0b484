use std::collections::{BTreeSet, HashMap};

use nalgebra::DMatrix;

use crate::models::UserRating;

/// Sentinel for an unrated cell. Safe only because the valid rating domain
/// is [1.0, 5.0].
pub const UNRATED: f64 = 0.0;

/// Dense user x movie rating matrix over the eligible rating set.
///
/// Row and column indices are assigned in ascending id order so that two
/// builds over the same rating snapshot produce identical matrices. Hash-map
/// iteration order must never leak into index assignment.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    matrix: DMatrix<f64>,
    user_index: HashMap<i64, usize>,
    movie_index: HashMap<i64, usize>,
    user_ids: Vec<i64>,
    movie_ids: Vec<i64>,
}

impl RatingMatrix {
    /// Builds the matrix from an eligible rating set. The caller is expected
    /// to have already dropped below-threshold users (the rating store's
    /// `eligible_ratings` contract); this builder simply indexes whatever
    /// users and movies appear in `ratings`.
    pub fn build(ratings: &[UserRating]) -> Self {
        let users: BTreeSet<i64> = ratings.iter().map(|r| r.user_id).collect();
        let movies: BTreeSet<i64> = ratings.iter().map(|r| r.movie_id).collect();

        let user_ids: Vec<i64> = users.into_iter().collect();
        let movie_ids: Vec<i64> = movies.into_iter().collect();

        let user_index: HashMap<i64, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();
        let movie_index: HashMap<i64, usize> = movie_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut matrix = DMatrix::from_element(user_ids.len(), movie_ids.len(), UNRATED);
        for rating in ratings {
            let row = user_index[&rating.user_id];
            let col = movie_index[&rating.movie_id];
            matrix[(row, col)] = rating.value;
        }

        Self {
            matrix,
            user_index,
            movie_index,
            user_ids,
            movie_ids,
        }
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn user_row(&self, user_id: i64) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn movie_col(&self, movie_id: i64) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    /// Users in ascending id order, matching matrix row order.
    pub fn user_ids(&self) -> &[i64] {
        &self.user_ids
    }

    /// Movies in ascending id order, matching matrix column order.
    pub fn movie_ids(&self) -> &[i64] {
        &self.movie_ids
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0 || self.matrix.ncols() == 0
    }

    /// The rating at (row, col), or None for the unrated sentinel.
    pub fn rating_at(&self, row: usize, col: usize) -> Option<f64> {
        let value = self.matrix[(row, col)];
        (value != UNRATED).then_some(value)
    }
}
