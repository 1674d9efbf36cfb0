use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::note::{Note, NoteFields};

/// Result of an upsert: the persisted note plus whether a new row was
/// inserted or an existing one updated.
pub struct UpsertResult {
    pub note: Note,
    pub created: bool,
}

/// Persistence seam for note rows, behind a trait so the upsert branch is
/// testable without a database.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn find_by_date(&self, user_id: Uuid, date: NaiveDate)
        -> Result<Option<Note>, sqlx::Error>;
    async fn insert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        fields: &NoteFields,
    ) -> Result<Note, sqlx::Error>;
    /// Replaces the four text fields in place, preserving id and created_at.
    async fn update_fields(&self, note_id: Uuid, fields: &NoteFields) -> Result<Note, sqlx::Error>;
}

/// Insert-or-update keyed by `(user_id, date)`.
///
/// Read-then-branch: the one-note-per-user-per-day invariant is enforced
/// here, not by a database constraint. Only the owning user writes their own
/// notes, so the read-then-write window is single-writer; concurrent updates
/// for the same date resolve last-write-wins.
pub async fn upsert_note<S: NoteStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    date: NaiveDate,
    fields: &NoteFields,
) -> Result<UpsertResult, sqlx::Error> {
    let existing = store.find_by_date(user_id, date).await?;

    match existing {
        Some(note) => {
            let updated = store.update_fields(note.id, fields).await?;
            info!("Updated note {} for user {user_id} on {date}", note.id);
            Ok(UpsertResult {
                note: updated,
                created: false,
            })
        }
        None => {
            let inserted = store.insert(user_id, date, fields).await?;
            info!("Inserted note {} for user {user_id} on {date}", inserted.id);
            Ok(UpsertResult {
                note: inserted,
                created: true,
            })
        }
    }
}

#[async_trait]
impl NoteStore for PgPool {
    async fn find_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Note>, sqlx::Error> {
        find_note_by_date(self, user_id, date).await
    }

    async fn insert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        fields: &NoteFields,
    ) -> Result<Note, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes
                (id, user_id, date, yesterday_text, today_text, blockers_text, learnings_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(&fields.yesterday_text)
        .bind(&fields.today_text)
        .bind(&fields.blockers_text)
        .bind(&fields.learnings_text)
        .fetch_one(self)
        .await
    }

    async fn update_fields(&self, note_id: Uuid, fields: &NoteFields) -> Result<Note, sqlx::Error> {
        sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET yesterday_text = $2, today_text = $3, blockers_text = $4, learnings_text = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(note_id)
        .bind(&fields.yesterday_text)
        .bind(&fields.today_text)
        .bind(&fields.blockers_text)
        .bind(&fields.learnings_text)
        .fetch_one(self)
        .await
    }
}

/// The note for `(user_id, date)`, if one exists. Also backs the form
/// pre-fill lookup when the selected date changes.
pub async fn find_note_by_date(
    pool: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE user_id = $1 AND date = $2")
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await
}

/// All notes for one user, newest date first.
pub async fn list_notes_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE user_id = $1 ORDER BY date DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Notes for any user in the set with date in `[start, end]` inclusive,
/// newest date first. Returns an empty list (not an error) when `user_ids`
/// is empty.
pub async fn list_notes_for_users(
    pool: &PgPool,
    user_ids: &[Uuid],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Note>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, Note>(
        r#"
        SELECT * FROM notes
        WHERE user_id = ANY($1) AND date >= $2 AND date <= $3
        ORDER BY date DESC
        "#,
    )
    .bind(user_ids)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}
