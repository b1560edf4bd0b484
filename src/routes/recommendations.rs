use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::Movie;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: i64,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

fn default_limit() -> usize {
    10
}

fn default_algorithm() -> String {
    "hybrid".to_string()
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub user_id: i64,
    pub algorithm: String,
    pub recommendations: Vec<Movie>,
    /// Fused scores, present for the hybrid strategy only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<Vec<f64>>,
}

/// Generates recommendations with the requested strategy
///
/// Degraded-data conditions (cold start, degenerate matrix) are already
/// resolved inside the engine; this handler only ever fails on malformed
/// input or a collaborator failure.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let RecommendationRequest {
        user_id,
        limit,
        algorithm,
    } = request;

    let (recommendations, confidence_scores) = match algorithm.as_str() {
        "collaborative" => {
            let movies = state
                .recommender
                .recommend_collaborative(user_id, limit)
                .await?;
            (movies, None)
        }
        "content_based" => {
            let movies = state
                .recommender
                .recommend_content_based(user_id, limit)
                .await?;
            (movies, None)
        }
        "hybrid" => {
            let scored = state.recommender.recommend_hybrid(user_id, limit).await?;
            let scores = scored.iter().map(|s| s.score).collect();
            let movies = scored.into_iter().map(|s| s.movie).collect();
            (movies, Some(scores))
        }
        other => {
            return Err(AppError::InvalidInput(format!(
                "Invalid algorithm '{}'. Choose from: collaborative, content_based, hybrid",
                other
            )));
        }
    };

    tracing::info!(
        user_id,
        algorithm = %algorithm,
        count = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(RecommendationResponse {
        user_id,
        algorithm,
        recommendations,
        confidence_scores,
    }))
}
