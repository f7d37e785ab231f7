use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{MusicSearchQuery, SpotifyToken},
};

/// Exposes a Spotify client-credentials token
pub async fn token(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<SpotifyToken>> {
    let token = state.spotify.fetch_token().await?;
    Ok(Json(token))
}

/// Proxies a playlist search to Spotify
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MusicSearchQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Search query is required".to_string()))?;

    tracing::debug!(user_id = auth.id(), query = %query, "Processing playlist search");

    let results = state.spotify.search_playlists(query).await?;
    Ok(Json(results))
}
