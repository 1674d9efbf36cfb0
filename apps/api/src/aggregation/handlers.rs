use axum::{
    extract::{Path, Query, State},
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

fn default_window() -> WindowKind {
    WindowKind::Today
}

#[derive(Deserialize)]
pub struct AggregateQuery {
    #[serde(default = "default_window")]
    pub window: WindowKind,
}

#[derive(Serialize)]
pub struct AggregateResponse {
    pub view: AggregatedView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET /api/v1/users/:id/aggregate?window=
///
/// Aggregates over the user's current in-memory selection, which reflects
/// optimistic toggle state ahead of the debounced commit. A store failure
/// degrades to an empty view with a warning, never a 5xx.
pub async fn handle_aggregate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AggregateQuery>,
) -> Result<Json<AggregateResponse>, AppError> {
    let user = user_store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    let selection = state.selection.current(&user);
    let today = Utc::now().date_naive();

    let (view, warning) = match aggregate(&state.db, &selection, query.window, today).await {
        Ok(view) => (view, None),
        Err(e) => {
            warn!("Aggregation fetch failed for user {id}: {e}");
            (
                AggregatedView::empty(query.window),
                Some(STORE_WARNING.to_string()),
            )
        }
    };

    Ok(Json(AggregateResponse { view, warning }))
}
