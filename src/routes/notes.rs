use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppState, AuthUser},
    error::AppResult,
    models::{CreateNoteRequest, NoteListQuery, NoteResponse, UpdateNoteRequest},
    services::notes,
};

/// Root notes of the caller, optionally for one movie
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<NoteListQuery>,
) -> AppResult<Json<Vec<NoteResponse>>> {
    let listed = notes::list_notes(
        state.repository.as_ref(),
        auth.id(),
        params.movie_id.as_deref(),
    )
    .await?;
    Ok(Json(listed))
}

pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<NoteResponse>)> {
    let note = request.validate()?;
    let created = notes::create_note(state.repository.as_ref(), auth.id(), note).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<i64>,
) -> AppResult<Json<NoteResponse>> {
    let note = notes::get_note(state.repository.as_ref(), auth.id(), note_id).await?;
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<i64>,
    Json(request): Json<UpdateNoteRequest>,
) -> AppResult<Json<NoteResponse>> {
    let update = request.validate()?;
    let note = notes::update_note(state.repository.as_ref(), auth.id(), note_id, update).await?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<i64>,
) -> AppResult<StatusCode> {
    notes::delete_note(state.repository.as_ref(), auth.id(), note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
