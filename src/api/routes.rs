use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::AppState;
use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    routes::{health_check, movies, music, notes, profile, users, watchlist},
};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Resource routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/users", post(users::create_user))
        .route("/token", post(users::login).delete(users::logout))
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        // Notes
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // Watchlist
        .route(
            "/watchlist",
            get(watchlist::list_items).post(watchlist::add_item),
        )
        .route(
            "/watchlist/:id",
            axum::routing::put(watchlist::update_item).delete(watchlist::delete_item),
        )
        // Upstream searches
        .route("/search-movie", get(movies::search))
        .route("/spotify/token", get(music::token))
        .route("/spotify/search", get(music::search))
}
