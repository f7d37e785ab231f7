use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::{error::AppResult, models::default_avatar};

pub const MAX_TITLE_LEN: usize = 100;

/// A stored note joined with its author's display fields
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub edited: bool,
    pub movie_id: Option<String>,
    pub movie_title: Option<String>,
    pub author_username: String,
    /// `None` when the author has no profile row
    pub author_avatar: Option<String>,
}

impl Note {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Author avatar, falling back to the generated one when the profile is missing
    pub fn resolved_avatar(&self) -> String {
        self.author_avatar
            .clone()
            .unwrap_or_else(|| default_avatar(&self.author_username))
    }
}

/// Validated fields for a new note
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub parent_id: Option<i64>,
    pub movie_id: Option<String>,
    pub movie_title: Option<String>,
}

/// Partial note edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `None` leaves the tag alone, `Some(None)` clears it
    pub movie_id: Option<Option<String>>,
    pub movie_title: Option<Option<String>>,
}

impl NoteUpdate {
    /// Applies the edit. Any applied update marks the note as edited.
    pub fn apply(self, note: &mut Note, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(movie_id) = self.movie_id {
            note.movie_id = movie_id;
        }
        if let Some(movie_title) = self.movie_title {
            note.movie_title = movie_title;
        }
        note.edited = true;
        note.updated_at = now;
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub parent: Option<i64>,
    #[serde(alias = "movie_imdb_id")]
    pub movie_id: Option<String>,
    pub movie_title: Option<String>,
}

impl CreateNoteRequest {
    pub fn validate(self) -> AppResult<NewNote> {
        Ok(NewNote {
            title: required("title", self.title, MAX_TITLE_LEN)?,
            content: required("content", self.content, usize::MAX)?,
            parent_id: self.parent,
            movie_id: non_empty(optional("movie_id", self.movie_id, 20)?),
            movie_title: non_empty(optional("movie_title", self.movie_title, 200)?),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "movie_imdb_id")]
    pub movie_id: Option<String>,
    pub movie_title: Option<String>,
}

impl UpdateNoteRequest {
    pub fn validate(self) -> AppResult<NoteUpdate> {
        Ok(NoteUpdate {
            title: self
                .title
                .map(|t| required("title", Some(t), MAX_TITLE_LEN))
                .transpose()?,
            content: self
                .content
                .map(|c| required("content", Some(c), usize::MAX))
                .transpose()?,
            movie_id: optional("movie_id", self.movie_id, 20)?.map(|id| non_empty(Some(id))),
            movie_title: optional("movie_title", self.movie_title, 200)?
                .map(|title| non_empty(Some(title))),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteListQuery {
    #[serde(alias = "movie_imdb_id")]
    pub movie_id: Option<String>,
}

/// Coarse "time ago" label for a creation timestamp
pub fn time_since(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - created_at;
    let days = diff.num_days();
    let seconds = diff.num_seconds() - days * 86_400;

    if days > 365 {
        format!("{}y ago", days / 365)
    } else if days > 30 {
        format!("{}mo ago", days / 30)
    } else if days > 0 {
        format!("{}d ago", days)
    } else if seconds > 3600 {
        format!("{}h ago", seconds / 3600)
    } else if seconds > 60 {
        format!("{}m ago", seconds / 60)
    } else {
        "just now".to_string()
    }
}

/// A reply as rendered inside its root note
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_avatar: String,
    pub time_ago: String,
    pub edited: bool,
}

impl ReplyResponse {
    pub fn new(note: Note, now: DateTime<Utc>) -> Self {
        Self {
            author_avatar: note.resolved_avatar(),
            time_ago: time_since(note.created_at, now),
            id: note.id,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
            author_username: note.author_username,
            edited: note.edited,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: i64,
    pub author_id: i64,
    pub author_username: String,
    pub author_avatar: String,
    pub time_ago: String,
    pub edited: bool,
    pub parent: Option<i64>,
    pub movie_id: Option<String>,
    pub movie_title: Option<String>,
    pub replies: Vec<ReplyResponse>,
    pub reply_count: usize,
}

impl NoteResponse {
    /// Renders a note. Replies are only rendered beneath root notes.
    pub fn new(note: Note, replies: Vec<Note>, now: DateTime<Utc>) -> Self {
        let replies: Vec<ReplyResponse> = if note.is_reply() {
            Vec::new()
        } else {
            replies
                .into_iter()
                .map(|reply| ReplyResponse::new(reply, now))
                .collect()
        };

        Self {
            author_avatar: note.resolved_avatar(),
            time_ago: time_since(note.created_at, now),
            reply_count: replies.len(),
            replies,
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
            author: note.author_id,
            author_id: note.author_id,
            author_username: note.author_username,
            edited: note.edited,
            parent: note.parent_id,
            movie_id: note.movie_id,
            movie_title: note.movie_title,
        }
    }
}
