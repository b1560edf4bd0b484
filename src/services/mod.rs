//! The recommendation engine.
//!
//! Every entry point computes over a snapshot of ratings and catalog data
//! fetched at the start of the call: matrices are built fresh, used once and
//! discarded, so concurrent requests share no mutable state. Degraded-data
//! conditions (cold start, degenerate matrix, unknown item) resolve to
//! substitute results locally; only collaborator failures propagate.

use std::sync::Arc;

use nalgebra::DVector;

use crate::config::Config;
use crate::models::{Movie, UserRating};
use crate::store::{MovieCatalog, RatingStore, StoreResult};

pub mod collaborative;
pub mod content;
pub mod features;
pub mod hybrid;
pub mod matrix;
pub mod popularity;

use collaborative::CollaborativeOutcome;
use content::ContentOutcome;
use features::FeatureMatrix;
use hybrid::ScoredMovie;
use matrix::RatingMatrix;

/// Engine tuning knobs, separated from [`Config`] so the engine stays
/// testable without environment access.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_ratings_per_user: u32,
    pub min_rating_count: i64,
    pub max_features: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_ratings_per_user: 5,
            min_rating_count: 1,
            max_features: 1000,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            min_ratings_per_user: config.min_ratings_per_user,
            min_rating_count: config.min_rating_count,
            max_features: config.max_features,
        }
    }
}

/// Recommendation engine over the rating store and movie catalog.
#[derive(Clone)]
pub struct Recommender {
    ratings: Arc<dyn RatingStore>,
    catalog: Arc<dyn MovieCatalog>,
    config: EngineConfig,
}

impl Recommender {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        catalog: Arc<dyn MovieCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ratings,
            catalog,
            config,
        }
    }

    /// Collaborative filtering recommendations for a user.
    ///
    /// Cold-start users and degenerate matrices fall back to the popularity
    /// ranking instead of erroring.
    pub async fn recommend_collaborative(
        &self,
        user_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Movie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let ratings = self
            .ratings
            .eligible_ratings(self.config.min_ratings_per_user)
            .await?;
        let matrix = RatingMatrix::build(&ratings);

        match collaborative::rank_candidates(&matrix, user_id) {
            CollaborativeOutcome::Ranked(mut predictions) => {
                predictions.truncate(limit);
                tracing::debug!(
                    user_id,
                    candidates = predictions.len(),
                    matrix_rows = matrix.rows(),
                    matrix_cols = matrix.cols(),
                    "Collaborative candidates ranked"
                );
                self.resolve(predictions.iter().map(|p| p.0)).await
            }
            CollaborativeOutcome::ColdStart => {
                tracing::debug!(user_id, "Cold start, using popularity fallback");
                self.top_rated(self.config.min_rating_count, limit).await
            }
            CollaborativeOutcome::DegenerateModel => {
                tracing::debug!(
                    user_id,
                    matrix_rows = matrix.rows(),
                    matrix_cols = matrix.cols(),
                    "Matrix too small for reduction, using popularity fallback"
                );
                self.top_rated(self.config.min_rating_count, limit).await
            }
        }
    }

    /// Content-based recommendations for a user.
    pub async fn recommend_content_based(
        &self,
        user_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Movie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let user_ratings = self.ratings.user_ratings(user_id).await?;
        if user_ratings.is_empty() {
            tracing::debug!(user_id, "No ratings, using popularity fallback");
            return self.top_rated(self.config.min_rating_count, limit).await;
        }

        let movies = self.catalog.all_movies().await?;
        let features = FeatureMatrix::build(&movies, self.config.max_features);

        match content::rank_for_user(&features, &user_ratings) {
            ContentOutcome::Ranked(mut ranked) => {
                ranked.truncate(limit);
                tracing::debug!(user_id, candidates = ranked.len(), "Content candidates ranked");
                Ok(pick_from_snapshot(&movies, ranked.iter().map(|r| r.0)))
            }
            ContentOutcome::ColdStart => {
                tracing::debug!(user_id, "No usable profile, using popularity fallback");
                self.top_rated(self.config.min_rating_count, limit).await
            }
        }
    }

    /// Hybrid recommendations: rank-fused blend of both predictors.
    pub async fn recommend_hybrid(&self, user_id: i64, limit: usize) -> StoreResult<Vec<ScoredMovie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Oversized limits stay valid input; saturate instead of overflowing.
        let budget = limit.saturating_mul(2);
        let collaborative = self.recommend_collaborative(user_id, budget).await?;
        let content = self.recommend_content_based(user_id, budget).await?;

        tracing::debug!(
            user_id,
            collaborative = collaborative.len(),
            content = content.len(),
            "Fusing predictor rankings"
        );

        Ok(hybrid::fuse(collaborative, content, limit))
    }

    /// Movies similar to the given movie in text feature space.
    ///
    /// An unknown movie id yields an empty list: there is no sensible
    /// fallback target for an item query.
    pub async fn similar_movies(&self, movie_id: i64, limit: usize) -> StoreResult<Vec<Movie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let movies = self.catalog.all_movies().await?;
        let features = FeatureMatrix::build(&movies, self.config.max_features);

        let mut ranked = content::similar_movies(&features, movie_id);
        if ranked.is_empty() {
            tracing::debug!(movie_id, "Movie absent from feature space");
            return Ok(Vec::new());
        }
        ranked.truncate(limit);

        Ok(pick_from_snapshot(&movies, ranked.iter().map(|r| r.0)))
    }

    /// Popularity ranking: the fallback for every degraded predictor path
    /// and the data source for top-rated queries.
    pub async fn top_rated(&self, min_rating_count: i64, limit: usize) -> StoreResult<Vec<Movie>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let movies = self.catalog.top_rated(min_rating_count, limit).await?;
        Ok(popularity::rank(movies, limit))
    }

    /// Every rating a user has made (exposed for the ratings API).
    pub async fn user_ratings(&self, user_id: i64) -> StoreResult<Vec<UserRating>> {
        self.ratings.user_ratings(user_id).await
    }

    /// Resolves movie ids back to full records, silently dropping ids that
    /// no longer resolve (deleted between matrix build and lookup).
    async fn resolve(&self, ids: impl Iterator<Item = i64>) -> StoreResult<Vec<Movie>> {
        let mut movies = Vec::new();
        for id in ids {
            if let Some(movie) = self.catalog.movie(id).await? {
                movies.push(movie);
            }
        }
        Ok(movies)
    }
}

/// Maps ranked ids back to records from an already-fetched catalog snapshot.
fn pick_from_snapshot(movies: &[Movie], ids: impl Iterator<Item = i64>) -> Vec<Movie> {
    let by_id: std::collections::HashMap<i64, &Movie> =
        movies.iter().map(|m| (m.id, m)).collect();
    ids.filter_map(|id| by_id.get(&id).map(|&m| m.clone()))
        .collect()
}

/// Cosine of the angle between two vectors; 0.0 when either is a zero vector.
pub(crate) fn cosine(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom > 0.0 {
        a.dot(b) / denom
    } else {
        0.0
    }
}
