use std::sync::Arc;

use crate::services::{EngineConfig, Recommender};
use crate::store::{MovieCatalog, RatingStore};

/// Shared application state
///
/// Handlers reach the collaborator stores directly for CRUD and go through
/// the [`Recommender`] for everything with algorithmic substance.
#[derive(Clone)]
pub struct AppState {
    pub ratings: Arc<dyn RatingStore>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub recommender: Recommender,
    pub min_rating_count: i64,
}

impl AppState {
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        catalog: Arc<dyn MovieCatalog>,
        config: EngineConfig,
    ) -> Self {
        let min_rating_count = config.min_rating_count;
        let recommender = Recommender::new(ratings.clone(), catalog.clone(), config);
        Self {
            ratings,
            catalog,
            recommender,
            min_rating_count,
        }
    }
}
