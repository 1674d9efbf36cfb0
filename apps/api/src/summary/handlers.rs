use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregation::{aggregate, WindowKind};
use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::builder;
use crate::users::store as user_store;

fn default_window() -> WindowKind {
    WindowKind::Today
}

#[derive(Debug, Deserialize)]
pub struct SummarizeQuery {
    /// Window the aggregated view is currently showing. The builder filters
    /// to today regardless; the window only bounds the aggregated note set.
    #[serde(default = "default_window")]
    pub window: WindowKind,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    /// Sanitized HTML, held in UI state until cleared or superseded.
    pub summary: String,
}

/// POST /api/v1/users/:id/summary?window=
///
/// The full pipeline for one user action: current selection -> aggregated
/// view -> summary request -> summarization function. Any failure maps to a
/// categorized, retryable error; nothing here is fatal to the process.
pub async fn handle_summarize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SummarizeQuery>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let user = user_store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    let selection = state.selection.current(&user);
    let today = Utc::now().date_naive();

    let view = aggregate(&state.db, &selection, query.window, today).await?;
    let users = user_store::list_by_ids(&state.db, &selection).await?;

    let request = builder::build(&view.notes(), &users, &user, today)?;
    let summary = state.summary.summarize(&request).await?;

    Ok(Json(SummarizeResponse { summary }))
}
