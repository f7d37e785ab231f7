use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{AppState, AuthUser},
    error::{AppError, AppResult},
    models::{AccountResponse, CreateUserRequest, LoginRequest, TokenResponse},
    services::accounts,
};

/// Handler for account creation (public)
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    let sign_up = request.validate()?;
    let account = accounts::sign_up(state.repository.as_ref(), sign_up).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Handler for issuing a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AppError::InvalidInput(
            "username and password are required".to_string(),
        ));
    };

    let token = accounts::login(
        state.repository.as_ref(),
        username.trim(),
        password,
        state.session_ttl,
    )
    .await?;

    Ok(Json(token))
}

/// Handler for revoking the presented token
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    accounts::logout(state.repository.as_ref(), auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
