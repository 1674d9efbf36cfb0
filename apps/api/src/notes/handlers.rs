use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::note::{Note, NoteFields};
use crate::notes::{store, workflow};
use crate::state::AppState;
use crate::users::handlers::STORE_WARNING;
use crate::users::store as user_store;

#[derive(Serialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/v1/users/:id/notes
pub async fn handle_list_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotesResponse>, AppError> {
    let (notes, warning) = match store::list_notes_for_user(&state.db, id).await {
        Ok(notes) => (notes, None),
        Err(e) => {
            warn!("Note list fetch failed for user {id}: {e}");
            (Vec::new(), Some(STORE_WARNING.to_string()))
        }
    };
    Ok(Json(NotesResponse { notes, warning }))
}

#[derive(Deserialize)]
pub struct ByDateQuery {
    pub date: NaiveDate,
}

#[derive(Serialize)]
pub struct PrefillResponse {
    /// The requested date, echoed so a client can discard a stale response
    /// if the form date changed again while this lookup was in flight.
    pub date: NaiveDate,
    pub note: Option<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/v1/users/:id/notes/by-date?date=YYYY-MM-DD
///
/// Read-only form pre-fill: the note for that date if one exists, or null so
/// the form clears.
pub async fn handle_note_by_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<PrefillResponse>, AppError> {
    let (note, warning) = match store::find_note_by_date(&state.db, id, query.date).await {
        Ok(note) => (note, None),
        Err(e) => {
            warn!("Note prefill fetch failed for user {id}: {e}");
            (None, Some(STORE_WARNING.to_string()))
        }
    };
    Ok(Json(PrefillResponse {
        date: query.date,
        note,
        warning,
    }))
}

#[derive(Deserialize)]
pub struct SubmitNoteRequest {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub fields: NoteFields,
}

/// POST /api/v1/users/:id/notes
pub async fn handle_submit_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitNoteRequest>,
) -> Result<Json<workflow::UpsertOutcome>, AppError> {
    let user = user_store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    let selection = state.selection.current(&user);
    let today = Utc::now().date_naive();

    let outcome =
        workflow::submit(&state.db, user.id, &selection, req.date, &req.fields, today).await?;
    Ok(Json(outcome))
}
