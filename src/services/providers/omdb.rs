/// OMDb API provider
///
/// API Flow:
/// 1. Search: `/?s={query}&type=movie` → list of matches with IMDb IDs
/// 2. Details: `/?i={imdb_id}` → title, year, poster and IMDb rating
///
/// Every call carries the API key as a query parameter and is bounded by the
/// configured per-call timeout.
use crate::{
    config::OmdbSettings,
    error::{AppError, AppResult},
    models::{MovieDetails, MovieMatch, OmdbDetails, OmdbSearchResponse},
    services::providers::MovieProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const SEARCH_TYPE: &str = "movie";

#[derive(Clone)]
pub struct OmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    timeout: Duration,
}

impl OmdbProvider {
    pub fn new(http_client: HttpClient, settings: OmdbSettings) -> Self {
        if settings.api_key.trim().is_empty() {
            tracing::warn!("OMDB_API_KEY is not set; movie search requests will be rejected upstream");
        }

        Self {
            http_client,
            api_key: settings.api_key,
            api_url: settings.api_url,
            timeout: settings.timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl MovieProvider for OmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieMatch>> {
        let response = self
            .http_client
            .get(self.endpoint())
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("s", query),
                ("type", SEARCH_TYPE),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let results: OmdbSearchResponse = response.json().await?;

        if !results.is_success() {
            tracing::debug!(
                query = %query,
                error = results.error.as_deref().unwrap_or_default(),
                provider = "omdb",
                "Search returned no matches"
            );
            return Ok(Vec::new());
        }

        let matches: Vec<MovieMatch> = results.search.into_iter().map(MovieMatch::from).collect();

        tracing::info!(
            query = %query,
            results = matches.len(),
            provider = "omdb",
            "Movie search completed"
        );

        Ok(matches)
    }

    async fn movie_details(&self, imdb_id: &str) -> AppResult<Option<MovieDetails>> {
        let response = self
            .http_client
            .get(self.endpoint())
            .query(&[("apikey", self.api_key.as_str()), ("i", imdb_id)])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                imdb_id = %imdb_id,
                status = %response.status(),
                provider = "omdb",
                "Skipping movie with failed detail lookup"
            );
            return Ok(None);
        }

        let details: OmdbDetails = match response.json().await {
            Ok(details) => details,
            Err(e) if e.is_timeout() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    imdb_id = %imdb_id,
                    error = %e,
                    provider = "omdb",
                    "Skipping movie with unreadable details"
                );
                return Ok(None);
            }
        };

        if !details.is_success() {
            return Ok(None);
        }

        Ok(Some(details.into()))
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_url: &str) -> OmdbSettings {
        OmdbSettings {
            api_key: "test_key".to_string(),
            api_url: api_url.to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let provider = OmdbProvider::new(HttpClient::new(), settings("http://test.local/"));
        assert_eq!(provider.endpoint(), "http://test.local/");

        let provider = OmdbProvider::new(HttpClient::new(), settings("http://test.local"));
        assert_eq!(provider.endpoint(), "http://test.local/");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_upstream_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let provider = OmdbProvider::new(HttpClient::new(), settings("http://127.0.0.1:9"));
        let result = provider.search_movies("Inception").await;
        assert!(matches!(
            result,
            Err(AppError::Upstream(_)) | Err(AppError::UpstreamTimeout(_))
        ));
    }
}
