use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::error::AppResult;

/// A user's saved reference to an OMDb movie
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct WatchlistItem {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub added_at: DateTime<Utc>,
    pub watched: bool,
    pub rating: Option<i32>,
    pub notes: String,
    pub imdb_rating: Option<String>,
}

/// Validated fields for a new watchlist entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchlistItem {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub watched: bool,
    pub rating: Option<i32>,
    pub notes: String,
    pub imdb_rating: Option<String>,
}

/// Partial update of the user-editable fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WatchlistUpdate {
    pub watched: Option<bool>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
}

impl WatchlistUpdate {
    pub fn apply(self, item: &mut WatchlistItem) {
        if let Some(watched) = self.watched {
            item.watched = watched;
        }
        if let Some(rating) = self.rating {
            item.rating = Some(rating);
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub poster: Option<String>,
    #[serde(default)]
    pub watched: bool,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub imdb_rating: Option<String>,
}

impl AddWatchlistRequest {
    pub fn validate(self) -> AppResult<NewWatchlistItem> {
        Ok(NewWatchlistItem {
            imdb_id: required("imdb_id", self.imdb_id, 20)?,
            title: required("title", self.title, 200)?,
            year: required("year", self.year, 4)?,
            poster: optional("poster", self.poster, 500)?.unwrap_or_default(),
            watched: self.watched,
            rating: self.rating,
            notes: self.notes.unwrap_or_default(),
            imdb_rating: optional("imdb_rating", self.imdb_rating, 4)?,
        })
    }
}
