/// Spotify playlist search proxy
///
/// Each search exchanges the configured client credentials for a bearer token
/// (client-credentials grant) and then issues a single playlist search with it.
/// Tokens are fetched per call unless token caching is switched on.
use std::time::{Duration, Instant};

use reqwest::Client as HttpClient;
use tokio::sync::Mutex;

use crate::{
    config::SpotifySettings,
    error::{AppError, AppResult},
    models::SpotifyToken,
};

/// Tokens are dropped from the cache this long before Spotify expires them
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    client_id: String,
    token: SpotifyToken,
    expires_at: Instant,
}

pub struct SpotifyClient {
    http_client: HttpClient,
    settings: SpotifySettings,
    token_cache: Mutex<Option<CachedToken>>,
}

/// Transport and decoding failures surface as plain server errors
fn unexpected(err: reqwest::Error) -> AppError {
    AppError::Internal(format!("Spotify request failed: {}", err))
}

impl SpotifyClient {
    pub fn new(http_client: HttpClient, settings: SpotifySettings) -> Self {
        if settings.client_id.is_none() || settings.client_secret.is_none() {
            tracing::warn!("Spotify credentials are not configured; music search is disabled");
        }

        Self {
            http_client,
            settings,
            token_cache: Mutex::new(None),
        }
    }

    fn credentials(&self) -> AppResult<(&str, &str)> {
        match (&self.settings.client_id, &self.settings.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(AppError::ServiceUnavailable(
                "Spotify credentials not configured".to_string(),
            )),
        }
    }

    /// Returns a bearer token, from the cache when enabled and still fresh
    pub async fn fetch_token(&self) -> AppResult<SpotifyToken> {
        let (client_id, client_secret) = self.credentials()?;

        if self.settings.cache_tokens {
            let cache = self.token_cache.lock().await;
            if let Some(cached) = cache.as_ref() {
                if cached.client_id == client_id && cached.expires_at > Instant::now() {
                    tracing::debug!("Using cached Spotify token");
                    return Ok(cached.token.clone());
                }
            }
        }

        let token = self.request_token(client_id, client_secret).await?;

        if self.settings.cache_tokens {
            let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
            if !lifetime.is_zero() {
                *self.token_cache.lock().await = Some(CachedToken {
                    client_id: client_id.to_string(),
                    token: token.clone(),
                    expires_at: Instant::now() + lifetime,
                });
            }
        }

        Ok(token)
    }

    async fn request_token(&self, client_id: &str, client_secret: &str) -> AppResult<SpotifyToken> {
        let response = self
            .http_client
            .post(&self.settings.auth_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(self.settings.timeout)
            .send()
            .await
            .map_err(unexpected)?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Spotify token request rejected");
            return Err(AppError::ServiceUnavailable(format!(
                "Failed to get Spotify access token (status {})",
                status
            )));
        }

        response.json::<SpotifyToken>().await.map_err(unexpected)
    }

    /// Searches playlists and passes Spotify's JSON through unchanged
    pub async fn search_playlists(&self, query: &str) -> AppResult<serde_json::Value> {
        let token = self.fetch_token().await?;

        let url = format!("{}/search", self.settings.api_url.trim_end_matches('/'));
        let limit = self.settings.search_limit.to_string();
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token.access_token)
            .query(&[("q", query), ("type", "playlist"), ("limit", limit.as_str())])
            .timeout(self.settings.timeout)
            .send()
            .await
            .map_err(unexpected)?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, query = %query, "Spotify search rejected");
            return Err(AppError::ServiceUnavailable(format!(
                "Spotify search failed (status {})",
                status
            )));
        }

        let results: serde_json::Value = response.json().await.map_err(unexpected)?;

        tracing::info!(query = %query, provider = "spotify", "Playlist search completed");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(client_id: Option<&str>, client_secret: Option<&str>) -> SpotifySettings {
        SpotifySettings {
            client_id: client_id.map(str::to_string),
            client_secret: client_secret.map(str::to_string),
            // Nothing listens here; a network attempt would fail with Internal, not ServiceUnavailable.
            auth_url: "http://127.0.0.1:9/api/token".to_string(),
            api_url: "http://127.0.0.1:9/v1".to_string(),
            timeout: Duration::from_secs(1),
            search_limit: 5,
            cache_tokens: false,
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        for (id, secret) in [(None, None), (Some("id"), None), (None, Some("secret"))] {
            let client = SpotifyClient::new(HttpClient::new(), settings(id, secret));

            let token = client.fetch_token().await;
            assert!(matches!(token, Err(AppError::ServiceUnavailable(_))));

            let search = client.search_playlists("Inception soundtrack").await;
            assert!(matches!(search, Err(AppError::ServiceUnavailable(_))));
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal_error() {
        let client = SpotifyClient::new(HttpClient::new(), settings(Some("id"), Some("secret")));
        let result = client.fetch_token().await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
