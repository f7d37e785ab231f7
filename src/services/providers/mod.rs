/// Movie metadata provider abstraction
///
/// The search aggregator only talks to this trait, so the upstream (OMDb today)
/// can be swapped or mocked without touching the aggregation rules.
use crate::{
    error::AppResult,
    models::{MovieDetails, MovieMatch},
};

pub mod omdb;

pub use omdb::OmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Search movies by free text
    ///
    /// Returns matches in upstream order. "No results" is an empty list, not an error.
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieMatch>>;

    /// Fetch full metadata for one match
    ///
    /// `Ok(None)` means the upstream answered but had nothing usable (non-success
    /// status, error payload). Transport failures such as timeouts are `Err`.
    async fn movie_details(&self, imdb_id: &str) -> AppResult<Option<MovieDetails>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
