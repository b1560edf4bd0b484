use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Movie, NewMovie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_page_size")]
    pub limit: i64,
}

fn default_page_size() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct RankedQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub min_rating_count: Option<i64>,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct SimilarMoviesResponse {
    pub movie_id: i64,
    pub similar_movies: Vec<Movie>,
}

/// Paged catalog listing
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state
        .catalog
        .list_movies(query.offset.max(0), query.limit.clamp(0, 500))
        .await?;
    Ok(Json(movies))
}

/// Adds a movie to the catalog
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }

    let movie = state.catalog.create_movie(request).await?;
    tracing::info!(movie_id = movie.id, "Movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Fetches a single movie
pub async fn get_one(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<Movie>> {
    let movie = state
        .catalog
        .movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;
    Ok(Json(movie))
}

/// Top-rated movies by aggregate stats
pub async fn top_rated(
    State(state): State<AppState>,
    Query(query): Query<RankedQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let min_rating_count = query.min_rating_count.unwrap_or(state.min_rating_count);
    let movies = state
        .recommender
        .top_rated(min_rating_count, query.limit)
        .await?;
    Ok(Json(movies))
}

/// Movies similar to the given movie in text feature space
///
/// An unknown movie id yields an empty list rather than an error or a
/// popularity substitute.
pub async fn similar(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(query): Query<RankedQuery>,
) -> AppResult<Json<SimilarMoviesResponse>> {
    let similar_movies = state
        .recommender
        .similar_movies(movie_id, query.limit)
        .await?;
    Ok(Json(SimilarMoviesResponse {
        movie_id,
        similar_movies,
    }))
}
