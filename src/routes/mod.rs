use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

pub mod movies;
pub mod ratings;
pub mod recommendations;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Movies
        .route("/movies", get(movies::list).post(movies::create))
        .route("/movies/top-rated", get(movies::top_rated))
        .route("/movies/:id", get(movies::get_one))
        .route("/movies/:id/similar", get(movies::similar))
        // Ratings
        .route("/ratings", put(ratings::upsert))
        .route("/ratings/:user_id/:movie_id", axum::routing::delete(ratings::delete))
        .route("/users/:user_id/ratings", get(ratings::for_user))
        // Recommendations
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
