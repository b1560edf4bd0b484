//! Collaborator interfaces consumed by the recommendation engine.
//!
//! The engine only ever sees these two traits: a rating store producing
//! `(user_id, movie_id, value)` tuples and a catalog producing movie records
//! with aggregate rating stats. The Postgres implementation lives in
//! [`postgres`]; tests substitute mocks or an in-memory store.

use async_trait::async_trait;

use crate::models::{Movie, NewMovie, NewRating, Rating, UserRating};

pub mod postgres;

pub use postgres::PgStore;

#[cfg(test)]
use mockall::automock;

/// A collaborator call that failed. This is the only error kind the engine
/// propagates to its caller; degraded-data conditions (cold start, degenerate
/// matrix, unknown item) are resolved internally and never surface here.
#[derive(Debug, thiserror::Error)]
#[error("{collaborator}.{operation} failed: {source}")]
pub struct StoreError {
    /// Which collaborator failed ("rating_store" or "movie_catalog")
    pub collaborator: &'static str,
    /// The operation that was being performed
    pub operation: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl StoreError {
    pub fn new(
        collaborator: &'static str,
        operation: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self {
            collaborator,
            operation,
            source: source.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the persisted rating set.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// All ratings belonging to users with at least `min_ratings_per_user`
    /// ratings. Ratings of below-threshold users are dropped entirely,
    /// not zero-filled.
    async fn eligible_ratings(&self, min_ratings_per_user: u32) -> StoreResult<Vec<UserRating>>;

    /// Every rating a single user has made.
    async fn user_ratings(&self, user_id: i64) -> StoreResult<Vec<UserRating>>;

    /// Creates or replaces the rating for `(user_id, movie_id)` and
    /// recomputes the movie's aggregate stats. Never duplicates.
    async fn upsert_rating(&self, rating: NewRating) -> StoreResult<Rating>;

    /// Removes a rating and recomputes the movie's aggregate stats.
    /// Returns false when no such rating existed.
    async fn delete_rating(&self, user_id: i64, movie_id: i64) -> StoreResult<bool>;
}

/// Access to the movie catalog.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch a single movie, or None when it does not exist.
    async fn movie(&self, movie_id: i64) -> StoreResult<Option<Movie>>;

    /// The full catalog, in ascending id order.
    async fn all_movies(&self) -> StoreResult<Vec<Movie>>;

    /// Top movies by average rating among those with at least
    /// `min_rating_count` ratings. Ties are broken by ascending id.
    async fn top_rated(&self, min_rating_count: i64, limit: usize) -> StoreResult<Vec<Movie>>;

    /// Paged catalog listing.
    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>>;

    /// Inserts a new movie with zeroed aggregate stats.
    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie>;
}
