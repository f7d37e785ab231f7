use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Account, NewNote, NewUser, NewWatchlistItem, Note, NoteUpdate, ProfileUpdate, User,
        UserCredentials, WatchlistItem, WatchlistUpdate,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::{create_pool, PgRepository};

/// Persistence seam for accounts, sessions, watchlists and notes
///
/// Every per-user operation takes the caller's id and filters on it. A row owned
/// by somebody else is indistinguishable from a missing row: lookups return
/// `None` and deletes return `false`.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Inserts a user and its profile. A taken username is a `Conflict`.
    async fn create_user(&self, new_user: NewUser) -> AppResult<Account>;

    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>>;

    /// Loads a user with their profile, substituting a generated profile when the row is missing
    async fn get_account(&self, user_id: i64) -> AppResult<Option<Account>>;

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> AppResult<Option<Account>>;

    async fn create_session(
        &self,
        token: Uuid,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Resolves a session that has not expired at `now`
    async fn find_session_user(&self, token: Uuid, now: DateTime<Utc>) -> AppResult<Option<User>>;

    async fn delete_session(&self, token: Uuid) -> AppResult<()>;

    /// The user's entries, newest-added first
    async fn list_watchlist(&self, user_id: i64) -> AppResult<Vec<WatchlistItem>>;

    /// Adds an entry. A movie already on the user's list is a `Conflict`.
    async fn add_watchlist_item(
        &self,
        user_id: i64,
        item: NewWatchlistItem,
    ) -> AppResult<WatchlistItem>;

    async fn update_watchlist_item(
        &self,
        user_id: i64,
        item_id: i64,
        update: WatchlistUpdate,
    ) -> AppResult<Option<WatchlistItem>>;

    async fn delete_watchlist_item(&self, user_id: i64, item_id: i64) -> AppResult<bool>;

    /// The author's root notes, newest first, optionally limited to one movie
    async fn list_root_notes(&self, author_id: i64, movie_id: Option<&str>) -> AppResult<Vec<Note>>;

    /// Direct replies to a note, newest first
    async fn list_replies(&self, parent_id: i64) -> AppResult<Vec<Note>>;

    /// Unscoped lookup, used to validate reply targets
    async fn find_note(&self, note_id: i64) -> AppResult<Option<Note>>;

    async fn find_own_note(&self, author_id: i64, note_id: i64) -> AppResult<Option<Note>>;

    async fn create_note(&self, author_id: i64, note: NewNote) -> AppResult<Note>;

    /// Applies an edit and marks the note as edited
    async fn update_own_note(
        &self,
        author_id: i64,
        note_id: i64,
        update: NoteUpdate,
    ) -> AppResult<Option<Note>>;

    /// Deletes a note and, for root notes, its replies
    async fn delete_own_note(&self, author_id: i64, note_id: i64) -> AppResult<bool>;
}
