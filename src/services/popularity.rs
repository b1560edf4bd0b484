use crate::models::Movie;

/// Orders movies for the popularity fallback: average rating descending,
/// ascending movie id on ties, truncated to `limit`.
///
/// The catalog's `top_rated` query orders the same way; re-sorting here keeps
/// the guarantee independent of any particular store implementation. No
/// randomized or hash-dependent ordering is allowed on this path.
pub fn rank(mut movies: Vec<Movie>, limit: usize) -> Vec<Movie> {
    movies.sort_by(|a, b| {
        b.average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    movies.truncate(limit);
    movies
}
