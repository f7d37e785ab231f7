use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{AddWatchlistRequest, WatchlistItem, WatchlistUpdate},
};

/// The caller's watchlist, newest first
pub async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    let items = state.repository.list_watchlist(auth.id()).await?;
    Ok(Json(items))
}

pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddWatchlistRequest>,
) -> AppResult<(StatusCode, Json<WatchlistItem>)> {
    let item = request.validate()?;
    let item = state.repository.add_watchlist_item(auth.id(), item).await?;

    tracing::info!(
        user_id = auth.id(),
        imdb_id = %item.imdb_id,
        "Added movie to watchlist"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<i64>,
    Json(update): Json<WatchlistUpdate>,
) -> AppResult<Json<WatchlistItem>> {
    let item = state
        .repository
        .update_watchlist_item(auth.id(), item_id, update)
        .await?
        .ok_or_else(|| AppError::not_found("Watchlist item"))?;

    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state
        .repository
        .delete_watchlist_item(auth.id(), item_id)
        .await?
    {
        return Err(AppError::not_found("Watchlist item"));
    }

    Ok(StatusCode::NO_CONTENT)
}
