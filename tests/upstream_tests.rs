//! OMDb and Spotify clients against local stand-in servers

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinelog_api::{
    api::{create_router, AppState},
    config::{OmdbSettings, SpotifySettings},
    db::MemoryRepository,
    error::AppError,
    services::{movie_search, MovieProvider, OmdbProvider, SpotifyClient},
};

const OMDB_KEY: &str = "test-key";

/// Serves `router` on an ephemeral local port and returns its base URL
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn omdb_details(imdb_id: &str, poster: &str, rating: &str) -> Value {
    json!({
        "Title": format!("Movie {}", imdb_id),
        "Year": "2010",
        "imdbID": imdb_id,
        "Poster": poster,
        "imdbRating": rating,
        "Response": "True"
    })
}

async fn omdb_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("apikey").map(String::as_str) != Some(OMDB_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "Response": "False", "Error": "Invalid API key!" })),
        )
            .into_response();
    }

    if let Some(query) = params.get("s") {
        assert_eq!(params.get("type").map(String::as_str), Some("movie"));
        return match query.as_str() {
            "slow" => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "Response": "False", "Error": "Too slow" })).into_response()
            }
            "broken" => StatusCode::BAD_GATEWAY.into_response(),
            "Inception" => {
                let mut ids = vec![
                    "tt1375666".to_string(),
                    "tt_noposter".to_string(),
                    "tt_missing".to_string(),
                ];
                ids.extend((1..=12).map(|i| format!("tt{:07}", i)));
                let search: Vec<Value> = ids
                    .iter()
                    .map(|id| json!({ "Title": "Inception", "Year": "2010", "imdbID": id, "Type": "movie" }))
                    .collect();
                Json(json!({ "Search": search, "totalResults": "15", "Response": "True" }))
                    .into_response()
            }
            _ => Json(json!({ "Response": "False", "Error": "Movie not found!" })).into_response(),
        };
    }

    match params.get("i").map(String::as_str) {
        Some("tt1375666") => Json(omdb_details(
            "tt1375666",
            "https://m.media-amazon.com/images/inception.jpg",
            "8.8",
        ))
        .into_response(),
        Some("tt_noposter") => Json(omdb_details("tt_noposter", "N/A", "7.0")).into_response(),
        Some("tt_missing") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some(id) => Json(omdb_details(id, "https://example.com/poster.jpg", "N/A")).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn omdb_provider(timeout: Duration) -> OmdbProvider {
    let base_url = spawn(Router::new().route("/", get(omdb_handler))).await;
    OmdbProvider::new(
        reqwest::Client::new(),
        OmdbSettings {
            api_key: OMDB_KEY.to_string(),
            api_url: base_url,
            timeout,
        },
    )
}

#[tokio::test]
async fn test_omdb_search_and_details() {
    let provider = omdb_provider(Duration::from_secs(5)).await;

    let matches = provider.search_movies("Inception").await.unwrap();
    assert_eq!(matches.len(), 15);
    assert_eq!(matches[0].imdb_id, "tt1375666");

    let details = provider.movie_details("tt1375666").await.unwrap().unwrap();
    assert_eq!(details.title, "Movie tt1375666");
    assert_eq!(details.year, "2010");
    assert_eq!(details.rating.as_deref(), Some("8.8"));

    let details = provider.movie_details("tt_noposter").await.unwrap().unwrap();
    assert_eq!(details.poster, None);

    assert!(provider.movie_details("tt_missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_omdb_no_matches_is_empty() {
    let provider = omdb_provider(Duration::from_secs(5)).await;
    let matches = provider.search_movies("zzzzzz").await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_omdb_error_status_is_upstream_error() {
    let provider = omdb_provider(Duration::from_secs(5)).await;
    let result = provider.search_movies("broken").await;
    assert!(matches!(result, Err(AppError::Upstream(_))));
}

#[tokio::test]
async fn test_omdb_timeout() {
    let provider = omdb_provider(Duration::from_millis(200)).await;
    let result = provider.search_movies("slow").await;
    assert!(matches!(result, Err(AppError::UpstreamTimeout(_))));
}

#[tokio::test]
async fn test_aggregated_search_against_omdb() {
    let provider: Arc<dyn MovieProvider> = Arc::new(omdb_provider(Duration::from_secs(5)).await);

    let results = movie_search::search_movies(provider, "Inception").await.unwrap();

    // Ten lookups: the poster-less and the failed one are dropped
    assert_eq!(results.len(), 8);
    assert_eq!(results[0].id, "tt1375666");
    assert_eq!(results[0].rating, "8.8");
    assert_eq!(results[1].id, "tt0000001");
    assert_eq!(results[1].rating, "N/A");
    assert_eq!(results[7].id, "tt0000007");
    assert!(results.iter().all(|movie| movie.poster != "N/A"));
}

#[derive(Clone, Default)]
struct SpotifyStub {
    token_requests: Arc<AtomicUsize>,
}

async fn spotify_token(
    State(stub): State<SpotifyStub>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    stub.token_requests.fetch_add(1, Ordering::SeqCst);

    let basic = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !basic.starts_with("Basic ") || form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    Json(json!({
        "access_token": "stub-token",
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn spotify_search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if headers.get(AUTHORIZATION) != Some(&HeaderValue::from_static("Bearer stub-token")) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("q").map(String::as_str) == Some("fail") {
        return StatusCode::BAD_GATEWAY.into_response();
    }

    Json(json!({
        "playlists": {
            "items": [{ "id": "37i9dQZF1DX", "name": params.get("q") }],
            "limit": params.get("limit").and_then(|l| l.parse::<u32>().ok()),
            "type": params.get("type")
        }
    }))
    .into_response()
}

async fn spotify_client(stub: SpotifyStub, client_id: &str, cache_tokens: bool) -> SpotifyClient {
    let router = Router::new()
        .route("/api/token", post(spotify_token))
        .route("/v1/search", get(spotify_search))
        .with_state(stub);
    let base_url = spawn(router).await;

    SpotifyClient::new(
        reqwest::Client::new(),
        SpotifySettings {
            client_id: Some(client_id.to_string()),
            client_secret: Some("secret".to_string()),
            auth_url: format!("{}/api/token", base_url),
            api_url: format!("{}/v1", base_url),
            timeout: Duration::from_secs(5),
            search_limit: 5,
            cache_tokens,
        },
    )
}

#[tokio::test]
async fn test_spotify_playlist_search() {
    let stub = SpotifyStub::default();
    let client = spotify_client(stub.clone(), "client", false).await;

    let token = client.fetch_token().await.unwrap();
    assert_eq!(token.access_token, "stub-token");
    assert_eq!(token.expires_in, 3600);

    let results = client.search_playlists("Inception soundtrack").await.unwrap();
    assert_eq!(results["playlists"]["items"][0]["name"], "Inception soundtrack");
    assert_eq!(results["playlists"]["limit"], 5);
    assert_eq!(results["playlists"]["type"], "playlist");

    // Uncached: one token per call
    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_spotify_token_cache() {
    let stub = SpotifyStub::default();
    let client = spotify_client(stub.clone(), "client", true).await;

    client.search_playlists("Inception").await.unwrap();
    client.search_playlists("Interstellar").await.unwrap();
    client.fetch_token().await.unwrap();

    assert_eq!(stub.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_spotify_failed_search_is_unavailable() {
    let client = spotify_client(SpotifyStub::default(), "client", false).await;
    let result = client.search_playlists("fail").await;
    assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_spotify_rejected_token_is_unavailable() {
    let router = Router::new().route("/api/token", post(|| async { StatusCode::UNAUTHORIZED }));
    let base_url = spawn(router).await;

    let client = SpotifyClient::new(
        reqwest::Client::new(),
        SpotifySettings {
            client_id: Some("client".to_string()),
            client_secret: Some("wrong".to_string()),
            auth_url: format!("{}/api/token", base_url),
            api_url: format!("{}/v1", base_url),
            timeout: Duration::from_secs(5),
            search_limit: 5,
            cache_tokens: true,
        },
    );

    let result = client.search_playlists("Inception").await;
    assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_search_endpoint_maps_upstream_timeout() {
    let spotify = spotify_client(SpotifyStub::default(), "client", false).await;
    let state = AppState::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(omdb_provider(Duration::from_millis(200)).await),
        Arc::new(spotify),
        chrono::Duration::hours(1),
    );
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .post("/api/users")
        .json(&json!({ "username": "cobb", "email": "cobb@example.com", "password": "totem" }))
        .await
        .assert_status(StatusCode::CREATED);
    let token: Value = server
        .post("/api/token")
        .json(&json!({ "username": "cobb", "password": "totem" }))
        .await
        .json();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token["access"].as_str().unwrap())).unwrap();

    let response = server
        .get("/api/search-movie?q=slow")
        .add_header(AUTHORIZATION, bearer.clone())
        .await;
    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json();
    assert!(body["error"].is_string());

    let response = server
        .get("/api/search-movie?q=broken")
        .add_header(AUTHORIZATION, bearer.clone())
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = server
        .get("/api/spotify/search?q=Inception")
        .add_header(AUTHORIZATION, bearer)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["playlists"]["items"][0]["name"], "Inception");
}
