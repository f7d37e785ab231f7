use axum::{extract::State, Json};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{AccountResponse, UpdateProfileRequest},
};

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<AccountResponse>> {
    let account = state
        .repository
        .get_account(auth.id())
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(Json(account.into()))
}

/// Partial update of the caller's avatar and bio
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<AccountResponse>> {
    let update = request.validate(&auth.user.username)?;
    let account = state
        .repository
        .update_profile(auth.id(), update)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    tracing::info!(user_id = auth.id(), "Profile updated");

    Ok(Json(account.into()))
}
