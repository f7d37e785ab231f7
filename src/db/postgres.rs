use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        Account, NewNote, NewUser, NewWatchlistItem, Note, NoteUpdate, Profile, ProfileUpdate,
        User, UserCredentials, WatchlistItem, WatchlistUpdate,
    },
};

/// Creates a PostgreSQL connection pool and applies pending migrations
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

const NOTE_COLUMNS: &str = r#"
    n.id, n.title, n.content, n.created_at, n.updated_at, n.author_id, n.parent_id,
    n.edited, n.movie_id, n.movie_title,
    u.username AS author_username, p.avatar AS author_avatar
"#;

const NOTE_JOINS: &str = r#"
    JOIN users u ON u.id = n.author_id
    LEFT JOIN profiles p ON p.user_id = n.author_id
"#;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    email: String,
    date_joined: DateTime<Utc>,
    avatar: Option<String>,
    bio: Option<String>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        let profile = match (row.avatar, row.bio) {
            (Some(avatar), bio) => Profile {
                avatar,
                bio: bio.unwrap_or_default(),
            },
            (None, _) => Profile::for_username(&row.username),
        };

        Account {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                date_joined: row.date_joined,
            },
            profile,
        }
    }
}

/// Maps a unique-constraint violation to `Conflict`, everything else to `Database`
fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// `Repository` backed by PostgreSQL
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, new_user: NewUser) -> AppResult<Account> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, date_joined
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "A user with that username already exists."))?;

        sqlx::query("INSERT INTO profiles (user_id, avatar, bio) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&new_user.profile.avatar)
            .bind(&new_user.profile.bio)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Account {
            user,
            profile: new_user.profile,
        })
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    async fn get_account(&self, user_id: i64) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT u.id, u.username, u.email, u.date_joined, p.avatar, p.bio
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> AppResult<Option<Account>> {
        // Usernames never change, so the fallback profile can be built up front.
        let username =
            sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(username) = username else {
            return Ok(None);
        };
        let fallback = Profile::for_username(&username);

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            WITH p AS (
                INSERT INTO profiles (user_id, avatar, bio)
                VALUES ($1, COALESCE($2, $4), COALESCE($3, $5))
                ON CONFLICT (user_id) DO UPDATE
                SET avatar = COALESCE($2, profiles.avatar),
                    bio = COALESCE($3, profiles.bio)
                RETURNING user_id, avatar, bio
            )
            SELECT u.id, u.username, u.email, u.date_joined, p.avatar, p.bio
            FROM p
            JOIN users u ON u.id = p.user_id
            "#,
        )
        .bind(user_id)
        .bind(update.avatar)
        .bind(update.bio)
        .bind(&fallback.avatar)
        .bind(&fallback.bio)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn create_session(
        &self,
        token: Uuid,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_session_user(&self, token: Uuid, now: DateTime<Utc>) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.date_joined
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if user.is_none() {
            sqlx::query("DELETE FROM sessions WHERE token = $1 AND expires_at <= $2")
                .bind(token)
                .bind(now)
                .execute(&self.pool)
                .await?;
        }

        Ok(user)
    }

    async fn delete_session(&self, token: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_watchlist(&self, user_id: i64) -> AppResult<Vec<WatchlistItem>> {
        let items = sqlx::query_as::<_, WatchlistItem>(
            r#"
            SELECT * FROM watchlist_items
            WHERE user_id = $1
            ORDER BY added_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn add_watchlist_item(
        &self,
        user_id: i64,
        item: NewWatchlistItem,
    ) -> AppResult<WatchlistItem> {
        sqlx::query_as::<_, WatchlistItem>(
            r#"
            INSERT INTO watchlist_items
                (user_id, imdb_id, title, year, poster, watched, rating, notes, imdb_rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&item.imdb_id)
        .bind(&item.title)
        .bind(&item.year)
        .bind(&item.poster)
        .bind(item.watched)
        .bind(item.rating)
        .bind(&item.notes)
        .bind(&item.imdb_rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "This movie is already in your watchlist."))
    }

    async fn update_watchlist_item(
        &self,
        user_id: i64,
        item_id: i64,
        update: WatchlistUpdate,
    ) -> AppResult<Option<WatchlistItem>> {
        let item = sqlx::query_as::<_, WatchlistItem>(
            r#"
            UPDATE watchlist_items
            SET watched = COALESCE($3, watched),
                rating = COALESCE($4, rating),
                notes = COALESCE($5, notes)
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .bind(update.watched)
        .bind(update.rating)
        .bind(update.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete_watchlist_item(&self, user_id: i64, item_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_root_notes(&self, author_id: i64, movie_id: Option<&str>) -> AppResult<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes n {NOTE_JOINS}
            WHERE n.author_id = $1
              AND n.parent_id IS NULL
              AND ($2::TEXT IS NULL OR n.movie_id = $2)
            ORDER BY n.created_at DESC, n.id DESC
            "#
        );

        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(author_id)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(notes)
    }

    async fn list_replies(&self, parent_id: i64) -> AppResult<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes n {NOTE_JOINS}
            WHERE n.parent_id = $1
            ORDER BY n.created_at DESC, n.id DESC
            "#
        );

        let replies = sqlx::query_as::<_, Note>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(replies)
    }

    async fn find_note(&self, note_id: i64) -> AppResult<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes n {NOTE_JOINS} WHERE n.id = $1");

        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(note_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn find_own_note(&self, author_id: i64, note_id: i64) -> AppResult<Option<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes n {NOTE_JOINS} WHERE n.id = $1 AND n.author_id = $2"
        );

        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(note_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn create_note(&self, author_id: i64, note: NewNote) -> AppResult<Note> {
        let sql = format!(
            r#"
            WITH n AS (
                INSERT INTO notes (title, content, author_id, parent_id, movie_id, movie_title)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {NOTE_COLUMNS} FROM n {NOTE_JOINS}
            "#
        );

        let created = sqlx::query_as::<_, Note>(&sql)
            .bind(&note.title)
            .bind(&note.content)
            .bind(author_id)
            .bind(note.parent_id)
            .bind(&note.movie_id)
            .bind(&note.movie_title)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn update_own_note(
        &self,
        author_id: i64,
        note_id: i64,
        update: NoteUpdate,
    ) -> AppResult<Option<Note>> {
        let sql = format!(
            r#"
            WITH n AS (
                UPDATE notes
                SET title = COALESCE($3, title),
                    content = COALESCE($4, content),
                    movie_id = CASE WHEN $5 THEN $6 ELSE movie_id END,
                    movie_title = CASE WHEN $7 THEN $8 ELSE movie_title END,
                    edited = TRUE,
                    updated_at = now()
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            SELECT {NOTE_COLUMNS} FROM n {NOTE_JOINS}
            "#
        );

        let updated = sqlx::query_as::<_, Note>(&sql)
            .bind(note_id)
            .bind(author_id)
            .bind(update.title)
            .bind(update.content)
            .bind(update.movie_id.is_some())
            .bind(update.movie_id.flatten())
            .bind(update.movie_title.is_some())
            .bind(update.movie_title.flatten())
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete_own_note(&self, author_id: i64, note_id: i64) -> AppResult<bool> {
        // Replies go with their parent via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND author_id = $2")
            .bind(note_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
