use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::summary::builder::BuildError;
use crate::summary::client::SummaryError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant maps to a user-readable message; internal detail is logged,
/// never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error(transparent)]
    SummaryBuild(#[from] BuildError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::StoreUnavailable(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The notes store is temporarily unavailable. Please try again.".to_string(),
                )
            }
            AppError::SummaryBuild(e) => {
                let code = match e {
                    BuildError::NoNotesSelected => "NO_NOTES_SELECTED",
                    BuildError::NoTodayNotes => "NO_TODAY_NOTES",
                    BuildError::EmptyPayload => "EMPTY_PAYLOAD",
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, e.to_string())
            }
            AppError::Summary(e) => {
                let (status, code) = match e {
                    SummaryError::BadRequest(_) => (StatusCode::BAD_REQUEST, "SUMMARY_BAD_REQUEST"),
                    SummaryError::Upstream(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "SUMMARY_UPSTREAM")
                    }
                    SummaryError::Transport(_) => (StatusCode::BAD_GATEWAY, "SUMMARY_TRANSPORT"),
                };
                (status, code, e.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
