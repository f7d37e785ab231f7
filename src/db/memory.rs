use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        Account, NewNote, NewUser, NewWatchlistItem, Note, NoteUpdate, Profile, ProfileUpdate,
        User, UserCredentials, WatchlistItem, WatchlistUpdate,
    },
};

/// In-process `Repository`, used when no database is configured
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    users: HashMap<i64, StoredUser>,
    profiles: HashMap<i64, Profile>,
    sessions: HashMap<Uuid, StoredSession>,
    watchlist: HashMap<i64, WatchlistItem>,
    notes: HashMap<i64, StoredNote>,
    user_seq: i64,
    item_seq: i64,
    note_seq: i64,
}

struct StoredUser {
    user: User,
    password_hash: String,
}

struct StoredSession {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
struct StoredNote {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: i64,
    parent_id: Option<i64>,
    edited: bool,
    movie_id: Option<String>,
    movie_title: Option<String>,
}

impl MemoryInner {
    fn account(&self, user_id: i64) -> Option<Account> {
        let stored = self.users.get(&user_id)?;
        let profile = self
            .profiles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Profile::for_username(&stored.user.username));

        Some(Account {
            user: stored.user.clone(),
            profile,
        })
    }

    /// Joins a stored note with its author's username and avatar
    fn note(&self, stored: &StoredNote) -> Note {
        let author_username = self
            .users
            .get(&stored.author_id)
            .map(|u| u.user.username.clone())
            .unwrap_or_default();

        Note {
            id: stored.id,
            title: stored.title.clone(),
            content: stored.content.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            author_id: stored.author_id,
            parent_id: stored.parent_id,
            edited: stored.edited,
            movie_id: stored.movie_id.clone(),
            movie_title: stored.movie_title.clone(),
            author_username,
            author_avatar: self.profiles.get(&stored.author_id).map(|p| p.avatar.clone()),
        }
    }

    fn notes_where(&self, predicate: impl Fn(&StoredNote) -> bool) -> Vec<Note> {
        let mut notes: Vec<&StoredNote> = self.notes.values().filter(|n| predicate(n)).collect();
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        notes.into_iter().map(|n| self.note(n)).collect()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> AppResult<Account> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .values()
            .any(|u| u.user.username == new_user.username)
        {
            return Err(AppError::Conflict(
                "A user with that username already exists.".to_string(),
            ));
        }

        inner.user_seq += 1;
        let user = User {
            id: inner.user_seq,
            username: new_user.username,
            email: new_user.email,
            date_joined: Utc::now(),
        };

        inner.profiles.insert(user.id, new_user.profile.clone());
        inner.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
            },
        );

        Ok(Account {
            user,
            profile: new_user.profile,
        })
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.user.username == username)
            .map(|u| UserCredentials {
                id: u.user.id,
                username: u.user.username.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn get_account(&self, user_id: i64) -> AppResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner.account(user_id))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> AppResult<Option<Account>> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner.account(user_id) else {
            return Ok(None);
        };

        let profile = Profile {
            avatar: update.avatar.unwrap_or(current.profile.avatar),
            bio: update.bio.unwrap_or(current.profile.bio),
        };
        inner.profiles.insert(user_id, profile.clone());

        Ok(Some(Account {
            user: current.user,
            profile,
        }))
    }

    async fn create_session(
        &self,
        token: Uuid,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        inner.sessions.retain(|_, s| s.expires_at > now);
        inner
            .sessions
            .insert(token, StoredSession { user_id, expires_at });
        Ok(())
    }

    async fn find_session_user(&self, token: Uuid, now: DateTime<Utc>) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;
        let Some(session) = inner.sessions.get(&token) else {
            return Ok(None);
        };

        if session.expires_at <= now {
            inner.sessions.remove(&token);
            return Ok(None);
        }

        Ok(inner.users.get(&session.user_id).map(|u| u.user.clone()))
    }

    async fn delete_session(&self, token: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.remove(&token);
        Ok(())
    }

    async fn list_watchlist(&self, user_id: i64) -> AppResult<Vec<WatchlistItem>> {
        let inner = self.inner.read().await;
        let mut items: Vec<WatchlistItem> = inner
            .watchlist
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn add_watchlist_item(
        &self,
        user_id: i64,
        item: NewWatchlistItem,
    ) -> AppResult<WatchlistItem> {
        let mut inner = self.inner.write().await;

        if inner
            .watchlist
            .values()
            .any(|existing| existing.user_id == user_id && existing.imdb_id == item.imdb_id)
        {
            return Err(AppError::Conflict(
                "This movie is already in your watchlist.".to_string(),
            ));
        }

        inner.item_seq += 1;
        let stored = WatchlistItem {
            id: inner.item_seq,
            user_id,
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: item.poster,
            added_at: Utc::now(),
            watched: item.watched,
            rating: item.rating,
            notes: item.notes,
            imdb_rating: item.imdb_rating,
        };
        inner.watchlist.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_watchlist_item(
        &self,
        user_id: i64,
        item_id: i64,
        update: WatchlistUpdate,
    ) -> AppResult<Option<WatchlistItem>> {
        let mut inner = self.inner.write().await;
        let Some(item) = inner
            .watchlist
            .get_mut(&item_id)
            .filter(|item| item.user_id == user_id)
        else {
            return Ok(None);
        };

        update.apply(item);
        Ok(Some(item.clone()))
    }

    async fn delete_watchlist_item(&self, user_id: i64, item_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .watchlist
            .get(&item_id)
            .is_some_and(|item| item.user_id == user_id);
        if owned {
            inner.watchlist.remove(&item_id);
        }
        Ok(owned)
    }

    async fn list_root_notes(&self, author_id: i64, movie_id: Option<&str>) -> AppResult<Vec<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes_where(|n| {
            n.author_id == author_id
                && n.parent_id.is_none()
                && movie_id.map_or(true, |m| n.movie_id.as_deref() == Some(m))
        }))
    }

    async fn list_replies(&self, parent_id: i64) -> AppResult<Vec<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes_where(|n| n.parent_id == Some(parent_id)))
    }

    async fn find_note(&self, note_id: i64) -> AppResult<Option<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes.get(&note_id).map(|n| inner.note(n)))
    }

    async fn find_own_note(&self, author_id: i64, note_id: i64) -> AppResult<Option<Note>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .get(&note_id)
            .filter(|n| n.author_id == author_id)
            .map(|n| inner.note(n)))
    }

    async fn create_note(&self, author_id: i64, note: NewNote) -> AppResult<Note> {
        let mut inner = self.inner.write().await;

        inner.note_seq += 1;
        let now = Utc::now();
        let stored = StoredNote {
            id: inner.note_seq,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
            author_id,
            parent_id: note.parent_id,
            edited: false,
            movie_id: note.movie_id,
            movie_title: note.movie_title,
        };
        let created = inner.note(&stored);
        inner.notes.insert(stored.id, stored);

        Ok(created)
    }

    async fn update_own_note(
        &self,
        author_id: i64,
        note_id: i64,
        update: NoteUpdate,
    ) -> AppResult<Option<Note>> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner
            .notes
            .get(&note_id)
            .filter(|n| n.author_id == author_id)
            .map(|n| inner.note(n))
        else {
            return Ok(None);
        };

        let mut note = current;
        update.apply(&mut note, Utc::now());

        if let Some(stored) = inner.notes.get_mut(&note_id) {
            stored.title = note.title.clone();
            stored.content = note.content.clone();
            stored.movie_id = note.movie_id.clone();
            stored.movie_title = note.movie_title.clone();
            stored.edited = note.edited;
            stored.updated_at = note.updated_at;
        }

        Ok(Some(note))
    }

    async fn delete_own_note(&self, author_id: i64, note_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .notes
            .get(&note_id)
            .is_some_and(|n| n.author_id == author_id);
        if !owned {
            return Ok(false);
        }

        inner.notes.remove(&note_id);
        inner.notes.retain(|_, n| n.parent_id != Some(note_id));
        Ok(true)
    }
}
