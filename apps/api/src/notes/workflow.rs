use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::aggregation::{aggregate, AggregatedView, WindowKind};
use crate::errors::AppError;
use crate::models::note::{Note, NoteFields};
use crate::notes::store;
use crate::users::handlers::STORE_WARNING;

/// Form state returned to the client after a commit. Always reset to a
/// fresh, current-day state: the date goes back to today (not the date just
/// submitted) and all four fields are cleared.
#[derive(Debug, Serialize)]
pub struct FormState {
    pub date: NaiveDate,
    pub fields: NoteFields,
}

impl FormState {
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            date: today,
            fields: NoteFields::default(),
        }
    }
}

/// Outcome of one submission attempt. `committed_date` echoes the date that
/// was actually saved so a client can discard responses from a superseded
/// submission after changing the form date mid-flight.
#[derive(Debug, Serialize)]
pub struct UpsertOutcome {
    pub note: Note,
    pub created: bool,
    pub committed_date: NaiveDate,
    /// Refreshed full note list for the submitting user.
    pub notes: Vec<Note>,
    /// Refreshed aggregated view when the user's own roster is non-empty, so
    /// the just-saved note shows up without a manual refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<AggregatedView>,
    pub form: FormState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Validating step: trims all four fields and rejects an all-empty note.
pub fn validate_fields(fields: &NoteFields) -> Result<NoteFields, AppError> {
    let trimmed = fields.trimmed();
    if fields.is_empty() {
        return Err(AppError::Validation(
            "All fields are optional, but at least one must contain text to save a note."
                .to_string(),
        ));
    }
    Ok(trimmed)
}

/// Runs one submission attempt end to end:
/// validate -> check -> insert/update -> refresh -> reset form.
///
/// The check and the branch live in the store's upsert; refresh failures
/// after a successful commit degrade to a warning rather than failing the
/// submission.
pub async fn submit(
    pool: &PgPool,
    user_id: Uuid,
    selection: &[Uuid],
    date: NaiveDate,
    fields: &NoteFields,
    today: NaiveDate,
) -> Result<UpsertOutcome, AppError> {
    let trimmed = validate_fields(fields)?;

    let result = store::upsert_note(pool, user_id, date, &trimmed).await?;

    let mut warning = None;

    let notes = match store::list_notes_for_user(pool, user_id).await {
        Ok(notes) => notes,
        Err(e) => {
            warn!("Note refresh failed after commit for user {user_id}: {e}");
            warning = Some(STORE_WARNING.to_string());
            Vec::new()
        }
    };

    let view = if selection.is_empty() {
        None
    } else {
        match aggregate(pool, selection, WindowKind::Today, today).await {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("Re-aggregation failed after commit for user {user_id}: {e}");
                warning = Some(STORE_WARNING.to_string());
                None
            }
        }
    };

    Ok(UpsertOutcome {
        note: result.note,
        created: result.created,
        committed_date: date,
        notes,
        view,
        form: FormState::fresh(today),
        warning,
    })
}
