use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog movie with its aggregate rating stats.
///
/// Aggregates (`average_rating`, `rating_count`) are maintained by the rating
/// store on every rating write and are treated as a snapshot within a single
/// recommendation computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub average_rating: f64,
    pub rating_count: i64,
}

impl Movie {
    /// Concatenated text fields used for feature extraction.
    /// Missing fields are omitted, not null-padded.
    pub fn feature_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        if let Some(description) = &self.description {
            parts.push(description);
        }
        if let Some(genre) = &self.genre {
            parts.push(genre);
        }
        if let Some(director) = &self.director {
            parts.push(director);
        }
        parts.join(" ")
    }
}

/// Payload for creating a catalog movie.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
}

/// A stored user rating. At most one exists per `(user_id, movie_id)` pair;
/// re-rating updates the row in place.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub user_id: i64,
    pub movie_id: i64,
    pub value: f64,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or replacing a rating.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
    pub user_id: i64,
    pub movie_id: i64,
    pub value: f64,
    pub review: Option<String>,
}

/// Valid rating domain. Zero is excluded, which is what makes 0.0 safe as
/// the unrated sentinel in the rating matrix.
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

impl NewRating {
    pub fn value_in_range(&self) -> bool {
        (RATING_MIN..=RATING_MAX).contains(&self.value)
    }
}

/// Minimal rating tuple consumed by the recommendation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserRating {
    pub user_id: i64,
    pub movie_id: i64,
    pub value: f64,
}

/// Which predictor produced a scored candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Collaborative,
    ContentBased,
    Hybrid,
}
