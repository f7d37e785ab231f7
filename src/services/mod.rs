pub mod accounts;
pub mod movie_search;
pub mod music;
pub mod notes;
pub mod providers;

pub use music::SpotifyClient;
pub use providers::{MovieProvider, OmdbProvider};
