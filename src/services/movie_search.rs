use std::sync::Arc;

use crate::{error::AppResult, models::MovieSummary, services::providers::MovieProvider};

/// Upper bound on detail lookups per search
pub const MAX_DETAIL_LOOKUPS: usize = 10;
/// Upper bound on returned movies
pub const MAX_RESULTS: usize = 10;

/// Searches movies and enriches each match with its details
///
/// Detail lookups run one at a time in upstream order, so the result keeps the
/// provider's ranking. Matches whose lookup yields nothing, or whose details lack
/// a poster, title or year, are dropped. A blank query is an empty result.
pub async fn search_movies(
    provider: Arc<dyn MovieProvider>,
    query: &str,
) -> AppResult<Vec<MovieSummary>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let matches = provider.search_movies(query).await?;
    if matches.is_empty() {
        return Ok(Vec::new());
    }

    let mut results = Vec::with_capacity(MAX_RESULTS);
    let mut skipped = 0usize;

    for movie in matches.iter().take(MAX_DETAIL_LOOKUPS) {
        let Some(details) = provider.movie_details(&movie.imdb_id).await? else {
            skipped += 1;
            continue;
        };

        match MovieSummary::from_details(details) {
            Some(summary) => results.push(summary),
            None => skipped += 1,
        }

        if results.len() >= MAX_RESULTS {
            break;
        }
    }

    tracing::info!(
        query = %query,
        matches = matches.len(),
        results = results.len(),
        skipped,
        provider = provider.name(),
        "Movie search aggregated"
    );

    Ok(results)
}
