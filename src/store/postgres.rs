use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Movie, NewMovie, NewRating, Rating, UserRating};
use crate::store::{MovieCatalog, RatingStore, StoreError, StoreResult};

const RATING_STORE: &str = "rating_store";
const MOVIE_CATALOG: &str = "movie_catalog";

/// Postgres-backed implementation of both collaborator interfaces.
///
/// Aggregate stats (`average_rating`, `rating_count`) are recomputed inside
/// every rating write so the catalog stays consistent with the rating set.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recomputes a movie's aggregate stats from its current rating set.
    async fn refresh_movie_stats(&self, movie_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE movies SET
                average_rating = COALESCE(
                    (SELECT AVG(value) FROM ratings WHERE movie_id = $1), 0.0
                ),
                rating_count = (SELECT COUNT(*) FROM ratings WHERE movie_id = $1)
            WHERE id = $1
            "#,
        )
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RatingStore for PgStore {
    async fn eligible_ratings(&self, min_ratings_per_user: u32) -> StoreResult<Vec<UserRating>> {
        sqlx::query_as::<_, UserRating>(
            r#"
            SELECT r.user_id, r.movie_id, r.value
            FROM ratings r
            JOIN (
                SELECT user_id
                FROM ratings
                GROUP BY user_id
                HAVING COUNT(*) >= $1
            ) eligible ON eligible.user_id = r.user_id
            ORDER BY r.user_id, r.movie_id
            "#,
        )
        .bind(min_ratings_per_user as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(RATING_STORE, "eligible_ratings", e))
    }

    async fn user_ratings(&self, user_id: i64) -> StoreResult<Vec<UserRating>> {
        sqlx::query_as::<_, UserRating>(
            r#"
            SELECT user_id, movie_id, value
            FROM ratings
            WHERE user_id = $1
            ORDER BY movie_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(RATING_STORE, "user_ratings", e))
    }

    async fn upsert_rating(&self, rating: NewRating) -> StoreResult<Rating> {
        let stored = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, movie_id, value, review, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, movie_id) DO UPDATE SET
                value = EXCLUDED.value,
                review = EXCLUDED.review,
                updated_at = NOW()
            RETURNING user_id, movie_id, value, review, created_at, updated_at
            "#,
        )
        .bind(rating.user_id)
        .bind(rating.movie_id)
        .bind(rating.value)
        .bind(&rating.review)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new(RATING_STORE, "upsert_rating", e))?;

        self.refresh_movie_stats(rating.movie_id)
            .await
            .map_err(|e| StoreError::new(RATING_STORE, "upsert_rating", e))?;

        Ok(stored)
    }

    async fn delete_rating(&self, user_id: i64, movie_id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"DELETE FROM ratings WHERE user_id = $1 AND movie_id = $2"#,
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::new(RATING_STORE, "delete_rating", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.refresh_movie_stats(movie_id)
            .await
            .map_err(|e| StoreError::new(RATING_STORE, "delete_rating", e))?;

        Ok(true)
    }
}

#[async_trait]
impl MovieCatalog for PgStore {
    async fn movie(&self, movie_id: i64) -> StoreResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, director, year, average_rating, rating_count
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::new(MOVIE_CATALOG, "movie", e))
    }

    async fn all_movies(&self) -> StoreResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, director, year, average_rating, rating_count
            FROM movies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(MOVIE_CATALOG, "all_movies", e))
    }

    async fn top_rated(&self, min_rating_count: i64, limit: usize) -> StoreResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, director, year, average_rating, rating_count
            FROM movies
            WHERE rating_count >= $1
            ORDER BY average_rating DESC, id ASC
            LIMIT $2
            "#,
        )
        .bind(min_rating_count)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(MOVIE_CATALOG, "top_rated", e))
    }

    async fn list_movies(&self, offset: i64, limit: i64) -> StoreResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, director, year, average_rating, rating_count
            FROM movies
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::new(MOVIE_CATALOG, "list_movies", e))
    }

    async fn create_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, description, genre, director, year, average_rating, rating_count)
            VALUES ($1, $2, $3, $4, $5, 0.0, 0)
            RETURNING id, title, description, genre, director, year, average_rating, rating_count
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.genre)
        .bind(&movie.director)
        .bind(movie.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new(MOVIE_CATALOG, "create_movie", e))
    }
}
