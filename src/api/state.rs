use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::{create_pool, MemoryRepository, PgRepository, Repository},
    services::{MovieProvider, OmdbProvider, SpotifyClient},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub movie_provider: Arc<dyn MovieProvider>,
    pub spotify: Arc<SpotifyClient>,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn Repository>,
        movie_provider: Arc<dyn MovieProvider>,
        spotify: Arc<SpotifyClient>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            repository,
            movie_provider,
            spotify,
            session_ttl,
        }
    }

    /// Wires the store and upstream clients described by `config`
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let repository: Arc<dyn Repository> = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(PgRepository::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using the in-memory store");
                Arc::new(MemoryRepository::new())
            }
        };

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("cinelog-api/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let movie_provider = Arc::new(OmdbProvider::new(http_client.clone(), config.omdb()));
        let spotify = Arc::new(SpotifyClient::new(http_client, config.spotify()));

        Ok(Self::new(
            repository,
            movie_provider,
            spotify,
            config.session_ttl(),
        ))
    }
}
