use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::state::AppState;
use crate::summary::prompts;

/// Wire format of the summarization function. Kept distinct from the rest of
/// the API: this endpoint stands in for the deployed serverless function, so
/// its error body is a flat `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct GenerateSummaryRequest {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub users: Vec<String>,
    /// Some callers omit the date; the prompt then uses the current day.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "requestingUserDisplayName", default)]
    pub requesting_user_display_name: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateSummaryResponse {
    pub summary: String,
}

pub enum FnError {
    BadRequest(String),
    Internal,
}

impl IntoResponse for FnError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            FnError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            FnError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred while generating the summary.".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// POST /generate-summary
///
/// The LLM-wrapping function: takes the prepared transcript, builds the
/// fixed instruction template and returns the generated HTML.
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    Json(req): Json<GenerateSummaryRequest>,
) -> Result<Json<GenerateSummaryResponse>, FnError> {
    if req.notes.trim().is_empty() {
        return Err(FnError::BadRequest(
            "No notes provided to summarize.".to_string(),
        ));
    }

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let system = prompts::build_system_prompt(date, &req.users, &req.requesting_user_display_name);

    match state.llm.call(&system, &req.notes).await {
        Ok(summary) => Ok(Json(GenerateSummaryResponse { summary })),
        Err(e) => {
            error!("Summary generation failed: {e}");
            Err(FnError::Internal)
        }
    }
}

/// Fallback for non-POST methods on /generate-summary.
pub async fn handle_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "This function only accepts POST requests." })),
    )
        .into_response()
}
