use serde::{Deserialize, Serialize};

/// Client-credentials grant response from the Spotify accounts service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct MusicSearchQuery {
    pub q: Option<String>,
}
