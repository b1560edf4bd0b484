use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{NewRating, Rating, UserRating, RATING_MAX, RATING_MIN};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserRatingsResponse {
    pub user_id: i64,
    pub ratings: Vec<UserRating>,
}

/// Creates or replaces the caller's rating for a movie
///
/// Re-rating the same movie updates the stored value in place; a
/// `(user_id, movie_id)` pair never maps to more than one rating. The rated
/// movie's aggregate stats are recomputed by the store on every write.
pub async fn upsert(
    State(state): State<AppState>,
    Json(request): Json<NewRating>,
) -> AppResult<Json<Rating>> {
    if !request.value_in_range() {
        return Err(AppError::InvalidInput(format!(
            "Rating must be between {} and {}",
            RATING_MIN, RATING_MAX
        )));
    }

    if state.catalog.movie(request.movie_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Movie {} not found",
            request.movie_id
        )));
    }

    let rating = state.ratings.upsert_rating(request).await?;
    tracing::info!(
        user_id = rating.user_id,
        movie_id = rating.movie_id,
        value = rating.value,
        "Rating stored"
    );
    Ok(Json(rating))
}

/// Removes a rating
pub async fn delete(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let deleted = state.ratings.delete_rating(user_id, movie_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "No rating by user {} for movie {}",
            user_id, movie_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Lists a user's ratings
pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserRatingsResponse>> {
    let ratings = state.recommender.user_ratings(user_id).await?;
    Ok(Json(UserRatingsResponse { user_id, ratings }))
}
