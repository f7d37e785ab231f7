use axum::{
    extract::{Extension, Query, State},
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::AppResult,
    middleware::request_id::RequestId,
    models::{MovieSearchQuery, MovieSearchResponse},
    services::movie_search,
};

/// Handler for the aggregated movie search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    auth: AuthUser,
    Query(params): Query<MovieSearchQuery>,
) -> AppResult<Json<MovieSearchResponse>> {
    let query = params.q.unwrap_or_default();

    tracing::info!(
        request_id = %request_id,
        user_id = auth.id(),
        query = %query,
        "Processing movie search"
    );

    let results = movie_search::search_movies(state.movie_provider.clone(), &query).await?;
    Ok(Json(MovieSearchResponse { results }))
}
