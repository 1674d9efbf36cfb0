use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::aggregation::{aggregate, AggregatedView, WindowKind};
use crate::errors::AppError;
use crate::state::AppState;
use crate::users::handlers::STORE_WARNING;
use crate::users::store as user_store;

#[derive(Deserialize)]
pub struct ToggleRequest {
    /// Colleague whose membership in the roster is flipped.
    pub user_id: Uuid,
    /// Window to re-aggregate with; defaults to the Today view.
    #[serde(default)]
    pub window: Option<WindowKind>,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub selection: Vec<Uuid>,
    pub view: AggregatedView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /api/v1/users/:id/selection/toggle
///
/// Flips the colleague in the in-memory selection and re-aggregates from the
/// optimistic state right away; the persistence commit runs on its own
/// debounced timer and is never waited on here.
pub async fn handle_toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let user = user_store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    let selection = state.selection.toggle(&user, req.user_id);

    let window = req.window.unwrap_or(WindowKind::Today);
    let today = Utc::now().date_naive();
    let (view, warning) = match aggregate(&state.db, &selection, window, today).await {
        Ok(view) => (view, None),
        Err(e) => {
            warn!("Re-aggregation failed after toggle for user {id}: {e}");
            (
                AggregatedView::empty(window),
                Some(STORE_WARNING.to_string()),
            )
        }
    };

    // A pending commit failure from an earlier toggle also surfaces here.
    let warning = warning.or_else(|| state.selection.commit_warning(user.id));

    Ok(Json(ToggleResponse {
        selection,
        view,
        warning,
    }))
}

#[derive(Serialize)]
pub struct SelectionResponse {
    pub selection: Vec<Uuid>,
    /// Present when the last debounced commit for this user failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/v1/users/:id/selection
pub async fn handle_get_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SelectionResponse>, AppError> {
    let user = user_store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    Ok(Json(SelectionResponse {
        selection: state.selection.current(&user),
        warning: state.selection.commit_warning(user.id),
    }))
}
