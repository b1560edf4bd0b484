//! In-memory collaborator store used by the integration suites.
//!
//! Mirrors the Postgres implementation's contracts: stable orderings,
//! upsert-never-duplicate semantics and aggregate stat recomputation on
//! every rating write.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use cinerec_api::models::{Movie, NewMovie, NewRating, Rating, UserRating};
use cinerec_api::services::{EngineConfig, Recommender};
use cinerec_api::state::AppState;
use cinerec_api::store::{MovieCatalog, RatingStore, StoreResult};

pub struct InMemoryStore {
    movies: RwLock<BTreeMap<i64, Movie>>,
    ratings: RwLock<BTreeMap<(i64, i64), Rating>>,
    next_movie_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            movies: RwLock::new(BTreeMap::new()),
            ratings: RwLock::new(BTreeMap::new()),
            next_movie_id: AtomicI64::new(1),
        })
    }

    pub async fn seed_movie(
        &self,
        title: &str,
        genre: &str,
        director: &str,
        description: &str,
    ) -> i64 {
        let id = self.next_movie_id.fetch_add(1, Ordering::SeqCst);
        self.movies.write().await.insert(
            id,
            Movie {
                id,
                title: title.to_string(),
                description: Some(description.to_string()),
                genre: Some(genre.to_string()),
                director: Some(director.to_string()),
                year: None,
                average_rating: 0.0,
                rating_count: 0,
            },
        );
        id
    }

    pub async fn seed_rating(&self, user_id: i64, movie_id: i64, value: f64) {
        self.upsert_rating(NewRating {
            user_id,
            movie_id,
            value,
            review: None,
        })
        .await
        .expect("in-memory upsert cannot fail");
    }

    async fn refresh_stats(&self, movie_id: i64) {
        let ratings = self.ratings.read().await;
        let values: Vec<f64> = ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.value)
            .collect();
        drop(ratings);

        let mut movies = self.movies.write().await;
        if let Some(movie) = movies.get_mut(&movie_id) {
            movie.rating_count = values.len() as i64;
            movie.average_rating = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
        }
    }
}

#[async_trait]
impl RatingStore for InMemoryStore {
    async fn eligible_ratings(&self, min_ratings_per_user: u32) -> StoreResult<Vec<UserRating>> {
        let ratings = self.ratings.read().await;

        let mut per_user: BTreeMap<i64, usize> = BTreeMap::new();
        for rating in ratings.values() {
            *per_user.entry(rating.user_id).or_insert(0) += 1;
        }

        Ok(ratings
            .values()
            .filter(|r| per_user[&r.user_id] >= min_ratings_per_user as usize)
            .map(|r| UserRating {
                user_id: r.user_id,
                movie_id: r.movie_id,
                value: r.value,
            })
            .collect())
    }

    async fn user_ratings(&self, user_id: i64) -> StoreResult<Vec<UserRating>> {
        let ratings = self.ratings.read().await;
        Ok(ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| UserRating {
                user_id: r.user_id,
                movie_id: r.movie_id,
                value: r.value,
            })
            .collect())
    }

    async fn upsert_rating(&self, rating: NewRating) -> StoreResult<Rating> {
        let key = (rating.user_id, rating.movie_id);
        let stored = {
            let mut ratings = self.ratings.write().await;
            match ratings.get_mut(&key) {
                Some(existing) => {
                    existing.value = rating.value;
                    existing.review = rating.review;
                    existing.updated_at = Some(Utc::now());
                    existing.clone()
                }
                None => {
                    let stored = Rating {
                        user_id: rating.user_id,
                        movie_id: rating.movie_id,
                        value: rating.value,
                        review: rating.review,
                        created_at: Utc::now(),
                        updated_at: None,
                    };
                    ratings.insert(key, stored.clone());
                    stored
                }
            }
        };

        self.refresh_stats(stored.movie_id).await;
        Ok(stored)
    }

    async fn delete_rating(&self, user_id: i64, movie_id: i64) -> StoreResult<bool> {
        let removed = self
            .ratings
            .write()
            .await
            .remove(&(user_id, movie_id))
            .is_some();
        if removed {
            self.refresh_stats(movie_id).await;
        }
        Ok(removed)
    }
}

#[async_trait]
impl MovieCatalog for InMemoryStore {
    async fn movie(&self, movie_id: i64) -> StoreResult<Option<Movie>> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }

    async fn all_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.movies.read().await.values().cloned().collect())
    }

    async fn top_rated(&self, min_rating_count: i64, limit: usize) -> StoreResult<Vec<Movie>> {
        let mut movies: Vec<Movie> = self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.rating_count >= min_rating_count)
            .cloned()
            .collect();
        movies.sort_by(|a, b| {
            b.average_rating
                .partial_cmp(&a.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        movies.truncate(limit);
        Ok(movies)
    }

    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>> {
        Ok(self
            .movies
            .read()
            .await
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let id = self.next_movie_id.fetch_add(1, Ordering::SeqCst);
        let stored = Movie {
            id,
            title: movie.title,
            description: movie.description,
            genre: movie.genre,
            director: movie.director,
            year: movie.year,
            average_rating: 0.0,
            rating_count: 0,
        };
        self.movies.write().await.insert(id, stored.clone());
        Ok(stored)
    }
}

/// Engine config with a low eligibility threshold so small fixtures qualify.
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        min_ratings_per_user: 3,
        min_rating_count: 1,
        max_features: 1000,
    }
}

pub fn recommender(store: &Arc<InMemoryStore>) -> Recommender {
    Recommender::new(store.clone(), store.clone(), test_engine_config())
}

pub fn app_state(store: &Arc<InMemoryStore>) -> AppState {
    AppState::new(store.clone(), store.clone(), test_engine_config())
}

/// A 10-movie catalog split between two disjoint text clusters.
pub async fn seed_catalog(store: &InMemoryStore) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            store
                .seed_movie(
                    &format!("Starship Saga {i}"),
                    "scifi space adventure",
                    "Nova Reyes",
                    "galactic fleet battles among distant stars",
                )
                .await,
        );
    }
    for i in 0..5 {
        ids.push(
            store
                .seed_movie(
                    &format!("Countryside Romance {i}"),
                    "romance drama",
                    "Elena Moreau",
                    "quiet love story set in rural vineyards",
                )
                .await,
        );
    }
    ids
}

/// Five eligible users (>= 3 ratings each) over the seeded catalog. Users
/// 1-3 prefer the sci-fi cluster, users 4-5 the romance cluster.
pub async fn seed_ratings(store: &InMemoryStore, movie_ids: &[i64]) {
    for user_id in 1..=3 {
        store.seed_rating(user_id, movie_ids[0], 5.0).await;
        store.seed_rating(user_id, movie_ids[1], 4.5).await;
        store.seed_rating(user_id, movie_ids[5], 2.0).await;
        store.seed_rating(user_id, movie_ids[user_id as usize + 1], 4.0).await;
    }
    for user_id in 4..=5 {
        store.seed_rating(user_id, movie_ids[5], 5.0).await;
        store.seed_rating(user_id, movie_ids[6], 4.5).await;
        store.seed_rating(user_id, movie_ids[0], 1.5).await;
        store.seed_rating(user_id, movie_ids[user_id as usize + 2], 4.0).await;
    }
}
