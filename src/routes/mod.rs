use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod movies;
pub mod music;
pub mod notes;
pub mod profile;
pub mod users;
pub mod watchlist;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
