//! HTTP-level tests over the full router with an in-memory store.

mod common;

use axum_test::TestServer;
use serde_json::json;

use cinerec_api::routes::create_router;
use common::{app_state, seed_catalog, seed_ratings, InMemoryStore};

fn server(store: &std::sync::Arc<InMemoryStore>) -> TestServer {
    let app = create_router(app_state(store));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_and_get_movie() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server
        .post("/api/v1/movies")
        .json(&json!({
            "title": "Blade Runner",
            "genre": "scifi",
            "director": "Ridley Scott",
            "year": 1982
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["title"], "Blade Runner");
    assert_eq!(created["rating_count"], 0);

    let id = created["id"].as_i64().unwrap();
    let response = server.get(&format!("/api/v1/movies/{id}")).await;
    response.assert_status_ok();
    let fetched: serde_json::Value = response.json();
    assert_eq!(fetched["title"], "Blade Runner");
}

#[tokio::test]
async fn test_get_unknown_movie_is_404() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server.get("/api/v1/movies/999").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_movie_rejects_empty_title() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server
        .post("/api/v1/movies")
        .json(&json!({ "title": "   " }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_out_of_range_is_400() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    let server = server(&store);

    for value in [0.0, 0.5, 5.5, -1.0] {
        let response = server
            .put("/api/v1/ratings")
            .json(&json!({
                "user_id": 1,
                "movie_id": movie_ids[0],
                "value": value
            }))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_rating_unknown_movie_is_404() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server
        .put("/api/v1/ratings")
        .json(&json!({ "user_id": 1, "movie_id": 12345, "value": 4.0 }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rerating_updates_instead_of_duplicating() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    let server = server(&store);

    for value in [2.0, 4.5] {
        let response = server
            .put("/api/v1/ratings")
            .json(&json!({
                "user_id": 1,
                "movie_id": movie_ids[0],
                "value": value
            }))
            .await;
        response.assert_status_ok();
    }

    let response = server.get("/api/v1/users/1/ratings").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let ratings = body["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["value"], 4.5);

    // Aggregates follow the updated value.
    let response = server
        .get(&format!("/api/v1/movies/{}", movie_ids[0]))
        .await;
    let movie: serde_json::Value = response.json();
    assert_eq!(movie["rating_count"], 1);
    assert_eq!(movie["average_rating"], 4.5);
}

#[tokio::test]
async fn test_delete_rating() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    store.seed_rating(1, movie_ids[0], 3.0).await;
    let server = server(&store);

    let response = server
        .delete(&format!("/api/v1/ratings/1/{}", movie_ids[0]))
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server
        .delete(&format!("/api/v1/ratings/1/{}", movie_ids[0]))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_rejects_unknown_algorithm() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 1, "algorithm": "astrology" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_for_each_algorithm() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    seed_ratings(&store, &movie_ids).await;
    let server = server(&store);

    for algorithm in ["collaborative", "content_based", "hybrid"] {
        let response = server
            .post("/api/v1/recommendations")
            .json(&json!({
                "user_id": 1,
                "limit": 5,
                "algorithm": algorithm
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["algorithm"], algorithm);
        assert_eq!(body["user_id"], 1);
        assert!(!body["recommendations"].as_array().unwrap().is_empty());

        if algorithm == "hybrid" {
            let scores = body["confidence_scores"].as_array().unwrap();
            assert_eq!(
                scores.len(),
                body["recommendations"].as_array().unwrap().len()
            );
        } else {
            assert!(body.get("confidence_scores").is_none());
        }
    }
}

#[tokio::test]
async fn test_cold_start_recommendations_match_top_rated() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    seed_ratings(&store, &movie_ids).await;
    let server = server(&store);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "user_id": 99, "limit": 5, "algorithm": "collaborative" }))
        .await;
    response.assert_status_ok();
    let recommended: serde_json::Value = response.json();

    let response = server.get("/api/v1/movies/top-rated?limit=5").await;
    response.assert_status_ok();
    let top_rated: serde_json::Value = response.json();

    assert_eq!(recommended["recommendations"], top_rated);
}

#[tokio::test]
async fn test_similar_movies_endpoint() {
    let store = InMemoryStore::new();
    let movie_ids = seed_catalog(&store).await;
    let server = server(&store);

    let response = server
        .get(&format!("/api/v1/movies/{}/similar?limit=3", movie_ids[0]))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["movie_id"], movie_ids[0]);
    assert_eq!(body["similar_movies"].as_array().unwrap().len(), 3);

    // Unknown movie: empty list, not an error and not a fallback.
    let response = server.get("/api/v1/movies/424242/similar").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["similar_movies"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_header_is_echoed() {
    let store = InMemoryStore::new();
    let server = server(&store);

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_movie_listing_pages() {
    let store = InMemoryStore::new();
    seed_catalog(&store).await;
    let server = server(&store);

    let response = server.get("/api/v1/movies?offset=0&limit=4").await;
    response.assert_status_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page.as_array().unwrap().len(), 4);

    let response = server.get("/api/v1/movies?offset=8&limit=4").await;
    let page: serde_json::Value = response.json();
    assert_eq!(page.as_array().unwrap().len(), 2);
}
