use chrono::Utc;

use crate::{
    db::Repository,
    error::{AppError, AppResult},
    models::{NewNote, Note, NoteResponse, NoteUpdate},
};

/// Renders a note with its replies; replies are only looked up for root notes
async fn render(repository: &dyn Repository, note: Note) -> AppResult<NoteResponse> {
    let replies = if note.is_reply() {
        Vec::new()
    } else {
        repository.list_replies(note.id).await?
    };

    Ok(NoteResponse::new(note, replies, Utc::now()))
}

/// Lists the author's root notes with their replies, newest first
pub async fn list_notes(
    repository: &dyn Repository,
    author_id: i64,
    movie_id: Option<&str>,
) -> AppResult<Vec<NoteResponse>> {
    let movie_id = movie_id.map(str::trim).filter(|m| !m.is_empty());
    let roots = repository.list_root_notes(author_id, movie_id).await?;

    let mut rendered = Vec::with_capacity(roots.len());
    for note in roots {
        rendered.push(render(repository, note).await?);
    }

    Ok(rendered)
}

pub async fn get_note(
    repository: &dyn Repository,
    author_id: i64,
    note_id: i64,
) -> AppResult<NoteResponse> {
    let note = repository
        .find_own_note(author_id, note_id)
        .await?
        .ok_or_else(|| AppError::not_found("Note"))?;

    render(repository, note).await
}

/// Creates a root note or a reply authored by `author_id`
///
/// Replies attach to root notes only; replying to a reply is rejected.
pub async fn create_note(
    repository: &dyn Repository,
    author_id: i64,
    note: NewNote,
) -> AppResult<NoteResponse> {
    if let Some(parent_id) = note.parent_id {
        let parent = repository.find_note(parent_id).await?.ok_or_else(|| {
            AppError::InvalidInput(format!("parent: Note {} does not exist", parent_id))
        })?;

        if parent.is_reply() {
            return Err(AppError::InvalidInput(
                "parent: Replies can only be attached to top-level notes".to_string(),
            ));
        }
    }

    let created = repository.create_note(author_id, note).await?;

    tracing::info!(
        note_id = created.id,
        author_id,
        parent_id = ?created.parent_id,
        "Note created"
    );

    render(repository, created).await
}

pub async fn update_note(
    repository: &dyn Repository,
    author_id: i64,
    note_id: i64,
    update: NoteUpdate,
) -> AppResult<NoteResponse> {
    let updated = repository
        .update_own_note(author_id, note_id, update)
        .await?
        .ok_or_else(|| AppError::not_found("Note"))?;

    render(repository, updated).await
}

pub async fn delete_note(repository: &dyn Repository, author_id: i64, note_id: i64) -> AppResult<()> {
    if !repository.delete_own_note(author_id, note_id).await? {
        return Err(AppError::not_found("Note"));
    }

    tracing::info!(note_id, author_id, "Note deleted");
    Ok(())
}
