use crate::error::{AppError, AppResult};

pub mod movie;
pub mod music;
pub mod note;
pub mod user;
pub mod watchlist;

pub use movie::{
    MovieDetails, MovieMatch, MovieSearchQuery, MovieSearchResponse, MovieSummary,
    OmdbDetails, OmdbSearchResponse,
};
pub use music::{MusicSearchQuery, SpotifyToken};
pub use note::{
    CreateNoteRequest, NewNote, Note, NoteListQuery, NoteResponse, NoteUpdate, ReplyResponse,
    UpdateNoteRequest,
};
pub use user::{
    default_avatar, Account, AccountResponse, CreateUserRequest, LoginRequest, NewUser,
    Profile, ProfileUpdate, SignUp, TokenResponse, UpdateProfileRequest, User,
    UserCredentials,
};
pub use watchlist::{AddWatchlistRequest, NewWatchlistItem, WatchlistItem, WatchlistUpdate};

/// Trims a mandatory text field and checks its length (in characters)
pub(crate) fn required(field: &str, value: Option<String>, max_len: usize) -> AppResult<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{}: This field is required",
            field
        )));
    }
    check_len(field, value, max_len)
}

/// Length-checks an optional text field; empty strings are kept
pub(crate) fn optional(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> AppResult<Option<String>> {
    value
        .map(|v| check_len(field, v.trim().to_string(), max_len))
        .transpose()
}

fn check_len(field: &str, value: String, max_len: usize) -> AppResult<String> {
    if value.chars().count() > max_len {
        return Err(AppError::InvalidInput(format!(
            "{}: Ensure this field has no more than {} characters",
            field, max_len
        )));
    }
    Ok(value)
}
