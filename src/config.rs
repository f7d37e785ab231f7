use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. Without one the in-process store is used.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Lifetime of issued bearer sessions
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    /// OMDb API key
    #[serde(default)]
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Per-call timeout for OMDb requests
    #[serde(default = "default_omdb_timeout_secs")]
    pub omdb_timeout_secs: u64,

    #[serde(default)]
    pub spotify_client_id: Option<String>,

    #[serde(default)]
    pub spotify_client_secret: Option<String>,

    /// Spotify client-credentials token endpoint
    #[serde(default = "default_spotify_auth_url")]
    pub spotify_auth_url: String,

    /// Spotify Web API base URL
    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    #[serde(default = "default_spotify_timeout_secs")]
    pub spotify_timeout_secs: u64,

    /// Number of playlists requested per search
    #[serde(default = "default_spotify_search_limit")]
    pub spotify_search_limit: u32,

    /// Reuse Spotify access tokens until shortly before they expire
    #[serde(default)]
    pub spotify_token_cache: bool,
}

/// Settings handed to the OMDb client
#[derive(Debug, Clone)]
pub struct OmdbSettings {
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

/// Settings handed to the Spotify client
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub api_url: String,
    pub timeout: Duration,
    pub search_limit: u32,
    pub cache_tokens: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_omdb_timeout_secs() -> u64 {
    5
}

fn default_spotify_auth_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_spotify_timeout_secs() -> u64 {
    10
}

fn default_spotify_search_limit() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn omdb(&self) -> OmdbSettings {
        OmdbSettings {
            api_key: self.omdb_api_key.clone(),
            api_url: self.omdb_api_url.clone(),
            timeout: Duration::from_secs(self.omdb_timeout_secs),
        }
    }

    pub fn spotify(&self) -> SpotifySettings {
        SpotifySettings {
            client_id: non_blank(&self.spotify_client_id),
            client_secret: non_blank(&self.spotify_client_secret),
            auth_url: self.spotify_auth_url.clone(),
            api_url: self.spotify_api_url.clone(),
            timeout: Duration::from_secs(self.spotify_timeout_secs),
            search_limit: self.spotify_search_limit,
            cache_tokens: self.spotify_token_cache,
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

// An exported-but-empty variable counts as missing.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
